use crate::error::{AppError, AppResult};
use crate::store::{non_blank, AddressScope, ParticipantFilter, ParticipantStore, QuotaStore};
use chrono::{Days, NaiveDate, NaiveTime};
use common::model::dashboard::{RegionTotals, StatusTotals};
use common::requests::DashboardQuery;
use std::sync::Arc;

/// Residence-scoped filter shared by the dashboard and the exports. A
/// `date` restricts it to rows last updated on that (UTC) day.
pub fn residence_filter(query: &DashboardQuery) -> AppResult<ParticipantFilter> {
    let updated_between = match non_blank(&query.date) {
        None => None,
        Some(date) => {
            let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("invalid date '{date}', expected YYYY-MM-DD")))?;
            let from = day.and_time(NaiveTime::MIN).and_utc();
            let to = from
                .checked_add_days(Days::new(1))
                .ok_or_else(|| AppError::BadRequest(format!("date '{date}' out of range")))?;
            Some((from, to))
        }
    };

    Ok(ParticipantFilter {
        scope: AddressScope::Residence,
        province: non_blank(&query.province),
        regency: non_blank(&query.regency),
        district: non_blank(&query.district),
        village: non_blank(&query.village),
        kind: non_blank(&query.kind),
        updated_between,
        ..ParticipantFilter::default()
    })
}

#[derive(Clone)]
pub struct Dashboard {
    participants: Arc<dyn ParticipantStore>,
    quotas: Arc<dyn QuotaStore>,
}

impl Dashboard {
    pub fn new(participants: Arc<dyn ParticipantStore>, quotas: Arc<dyn QuotaStore>) -> Self {
        Dashboard {
            participants,
            quotas,
        }
    }

    /// Status counters plus what is left of the matching quota.
    pub fn totals(&self, query: &DashboardQuery) -> AppResult<StatusTotals> {
        let filter = residence_filter(query)?;
        let mut totals = self.participants.count_by_status(&filter)?;

        let quota = self.quotas.find(
            query.province.trim(),
            query.regency.trim(),
            query.kind.trim(),
        )?;
        totals.remaining_quota = match quota {
            Some(quota) if quota.total > 0 => quota.total - totals.done,
            _ => 0,
        };
        Ok(totals)
    }

    pub fn by_region(&self, query: &DashboardQuery) -> AppResult<Vec<RegionTotals>> {
        self.participants
            .count_by_region(&residence_filter(query)?)
    }
}
