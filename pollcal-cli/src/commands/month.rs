use anyhow::Result;
use chrono::Local;
use pollcal_core::config::PollCalConfig;
use pollcal_core::{MonthView, build_month_matrix};

use crate::render::render_month;

pub fn run(config: &PollCalConfig, month: Option<&str>) -> Result<()> {
    let view = match month {
        Some(month) => MonthView::parse(month)?,
        None => MonthView::containing(Local::now().date_naive())?,
    };

    let events = config.open_store().load();
    let matrix = build_month_matrix(view);

    println!("{}", render_month(&matrix, &events));
    Ok(())
}
