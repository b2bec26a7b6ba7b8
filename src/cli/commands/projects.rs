use chrono::Utc;

use obras_core::{
    format::{format_amount, AmountStyle},
    parse_reference_date, week_bounds, AnoteService, ObraService, SummaryService,
};
use obras_domain::WeekGroup;

use super::{flag_value, require_id};
use crate::cli::{
    context::CliContext,
    output::{self, amount_cell, anote_line, remaining_cell},
    registry::CommandEntry,
    CommandResult,
};

const AMOUNT_WIDTH: usize = 16;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "projects",
            "List projects with budget and remaining amount",
            "projects",
            cmd_projects,
        ),
        CommandEntry::new(
            "summary",
            "Show budget totals and this week's spending for a project",
            "summary <id>",
            cmd_summary,
        ),
        CommandEntry::new(
            "week",
            "List a project's expenses for one Monday-to-Sunday week",
            "week <id> [--date YYYY-MM-DD]",
            cmd_week,
        ),
        CommandEntry::new(
            "weeks",
            "List a project's expenses grouped by week, newest first",
            "weeks <id>",
            cmd_weeks,
        ),
    ]
}

fn cmd_projects(context: &mut CliContext, _args: &[String]) -> CommandResult {
    let store = context.open_store()?;
    let style = context.amount_style();
    let obras = ObraService::list(&store)?;
    if obras.is_empty() {
        output::info("No projects recorded yet.");
        return Ok(());
    }

    output::section("Projects");
    println!(
        "  {:>4}  {:<24}  {:>w$}  {:>w$}  {:>w$}",
        "ID",
        "NAME",
        "BUDGET",
        "SPENT",
        "REMAINING",
        w = AMOUNT_WIDTH
    );
    for obra in obras {
        let totals = SummaryService::totals(&store, obra.id)?;
        println!(
            "  {:>4}  {:<24}  {}  {}  {}",
            obra.id,
            obra.name,
            amount_cell(totals.budget, &style, AMOUNT_WIDTH),
            amount_cell(totals.spent, &style, AMOUNT_WIDTH),
            remaining_cell(&totals, &style, AMOUNT_WIDTH)
        );
    }
    Ok(())
}

fn cmd_summary(context: &mut CliContext, args: &[String]) -> CommandResult {
    let id = require_id(args, "summary <id>")?;
    let store = context.open_store()?;
    let style = context.amount_style();
    let offset = context.offset()?;
    let now = Utc::now().with_timezone(&offset);

    let summary = SummaryService::project_summary(&store, id, &now)?;
    output::section(format!("#{} {}", summary.obra.id, summary.obra.name));
    output::two_column(&[
        ("Budget", format_amount(summary.totals.budget, &style)),
        ("Spent", format_amount(summary.totals.spent, &style)),
        ("Remaining", remaining_cell(&summary.totals, &style, 0)),
        (
            "This week",
            format!(
                "{} ({} expenses)",
                format_amount(summary.current_week_total, &style),
                summary.current_week.len()
            ),
        ),
        ("Weeks recorded", summary.weeks.len().to_string()),
    ]);
    if summary.totals.is_over_budget() {
        output::warning("Spending is over budget.");
    }
    Ok(())
}

fn cmd_week(context: &mut CliContext, args: &[String]) -> CommandResult {
    let id = require_id(args, "week <id> [--date YYYY-MM-DD]")?;
    let store = context.open_store()?;
    let style = context.amount_style();
    let offset = context.offset()?;

    let reference = match flag_value(args, "--date")? {
        Some(raw) => parse_reference_date(raw)?,
        None => Utc::now().with_timezone(&offset).date_naive(),
    };
    let bounds = week_bounds(reference, &offset)?;
    let obra = ObraService::get(&store, id)?;
    let anotes = SummaryService::current_week(&store, id, &bounds.start)?;

    output::section(format!(
        "{}: {}",
        obra.name,
        WeekGroup::label_for(bounds.start_date(), bounds.end_date())
    ));
    if anotes.is_empty() {
        output::info("No expenses recorded this week.");
        return Ok(());
    }
    for anote in &anotes {
        println!("{}", anote_line(anote, &offset, &style));
    }
    output::separator();
    print_total("Week total", obras_core::total_amount(&anotes), &style);
    Ok(())
}

fn cmd_weeks(context: &mut CliContext, args: &[String]) -> CommandResult {
    let id = require_id(args, "weeks <id>")?;
    let store = context.open_store()?;
    let style = context.amount_style();
    let offset = context.offset()?;

    let obra = ObraService::get(&store, id)?;
    let groups = SummaryService::weeks(&store, id, &offset)?;
    output::section(&obra.name);
    if groups.is_empty() {
        output::info("No expenses recorded yet.");
        return Ok(());
    }
    for group in &groups {
        println!("{}", group.label);
        for anote in &group.anotes {
            println!("{}", anote_line(anote, &offset, &style));
        }
        print_total("Week total", group.total, &style);
        println!();
    }
    let all = AnoteService::list_for_obra(&store, id)?;
    print_total("Project total", obras_core::total_amount(&all), &style);
    Ok(())
}

fn print_total(label: &str, value: rust_decimal::Decimal, style: &AmountStyle) {
    println!("  {:<42}  {}", label, amount_cell(value, style, AMOUNT_WIDTH));
}
