use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};

use sublingo_app::App;
use sublingo_core::doctor::DoctorReport;

use crate::cli::{Cli, Command};

pub fn run_with_deps(cli: Cli, app: &App) -> Result<()> {
    match cli.command {
        Some(Command::Doctor) => run_doctor_command(app),
        None => run_root_command(app),
    }
}

fn run_root_command(app: &App) -> Result<()> {
    // broken settings are surfaced here, before the terminal is taken over
    app.load_settings()?;

    let _ = sublingo_tui::run_root(app)?;
    Ok(())
}

fn run_doctor_command(app: &App) -> Result<()> {
    let report = app.doctor();
    print_doctor_report(&report);
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(check.state.to_string()),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
