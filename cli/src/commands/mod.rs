//! Command implementations

pub mod host;
pub mod ls;
pub mod ps;
pub mod reload;
pub mod restart;
pub mod start;
pub mod stop;
pub mod update;

use clap::Args;

use crate::app::AppContext;

/// Instance address arguments shared by the fleet commands.
#[derive(Args)]
pub struct TargetArgs {
    /// Instances to act on: `[TYPE:]NAME[@HOST]`, a component type,
    /// `@HOST`, or nothing for every instance
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,
}

/// Print a column-aligned table: header row first, widths sized to fit.
fn print_table<const N: usize>(app: &AppContext, header: &[&str; N], rows: &[[String; N]]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    app.output.row(header, &widths);
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        app.output.row(&cells, &widths);
    }
}
