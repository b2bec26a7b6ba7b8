use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;

use obras_domain::{Anote, BudgetTotals, Obra, ProjectSummary, RowId, WeekGroup};

use crate::{
    aggregation::{budget_totals, filter_current_week, group_by_week, total_amount},
    AnoteService, CoreError, ObraService, ObraStore,
};

/// Builds the derived summary views straight from the stored entry list.
pub struct SummaryService;

impl SummaryService {
    /// Pure composition of the aggregation engine for an already loaded project.
    pub fn summarize<Tz: TimeZone>(
        obra: Obra,
        anotes: &[Anote],
        now: &DateTime<Tz>,
    ) -> ProjectSummary {
        let current_week = filter_current_week(anotes, now);
        let current_week_total: Decimal = total_amount(&current_week);
        ProjectSummary {
            totals: budget_totals(&obra, anotes),
            current_week,
            current_week_total,
            weeks: group_by_week(anotes, &now.timezone()),
            obra,
        }
    }

    pub fn totals<S: ObraStore + ?Sized>(
        store: &S,
        obra_id: RowId,
    ) -> Result<BudgetTotals, CoreError> {
        let obra = ObraService::get(store, obra_id)?;
        let anotes = store.list_anotes(obra_id)?;
        Ok(budget_totals(&obra, &anotes))
    }

    pub fn current_week<S, Tz>(
        store: &S,
        obra_id: RowId,
        now: &DateTime<Tz>,
    ) -> Result<Vec<Anote>, CoreError>
    where
        S: ObraStore + ?Sized,
        Tz: TimeZone,
    {
        let anotes = AnoteService::list_for_obra(store, obra_id)?;
        Ok(filter_current_week(&anotes, now))
    }

    pub fn weeks<S, Tz>(store: &S, obra_id: RowId, tz: &Tz) -> Result<Vec<WeekGroup>, CoreError>
    where
        S: ObraStore + ?Sized,
        Tz: TimeZone,
    {
        let anotes = AnoteService::list_for_obra(store, obra_id)?;
        Ok(group_by_week(&anotes, tz))
    }

    pub fn project_summary<S, Tz>(
        store: &S,
        obra_id: RowId,
        now: &DateTime<Tz>,
    ) -> Result<ProjectSummary, CoreError>
    where
        S: ObraStore + ?Sized,
        Tz: TimeZone,
    {
        let obra = ObraService::get(store, obra_id)?;
        let anotes = store.list_anotes(obra_id)?;
        Ok(Self::summarize(obra, &anotes, now))
    }
}
