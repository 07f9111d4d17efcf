//! Subcommand dispatch.

use anyhow::{Result, bail};
use dynaset_cli::render::{print_dynaset, print_sql_log};
use dynaset_cli::session::{SaveReport, Session};
use tracing::debug;

use crate::cli::{Cli, Command};

pub fn run(cli: &Cli) -> Result<()> {
    let mut session = Session::open(&cli.db, &cli.form)?;
    for selection in &cli.select {
        debug!(dynaset = %selection.dynaset, row = selection.row, "selecting row");
        session.select(selection)?;
    }

    match &cli.command {
        Command::Show(args) => show(&session, args.name.as_deref()),
        Command::Edit(args) => {
            let report = session.edit(&args.name, args.row, &args.set)?;
            finish(&session, &report)
        }
        Command::Insert(args) => {
            let report = session.insert(&args.name, &args.set)?;
            finish(&session, &report)
        }
        Command::Delete(args) => {
            let report = session.delete(&args.name, args.row)?;
            finish(&session, &report)
        }
    }
}

fn show(session: &Session, name: Option<&str>) -> Result<()> {
    let graph = session.graph();
    match name {
        Some(name) => print_dynaset(&graph.view(session.dynaset(name)?)?),
        None => {
            if graph.is_empty() {
                bail!("the form declares no dynasets");
            }
            for id in graph.ids() {
                print_dynaset(&graph.view(id)?);
            }
        }
    }
    Ok(())
}

fn finish(session: &Session, report: &SaveReport) -> Result<()> {
    println!("{report}");
    print_sql_log(&report.log);
    let id = session.dynaset(&report.dynaset)?;
    print_dynaset(&session.graph().view(id)?);
    Ok(())
}
