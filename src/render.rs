//! Text rendering of the demo page
use crate::{
    service::PlayerState,
    timeline::{format_amount, scenarios, Timeline},
};
use std::fmt::Write;

/// Stage index from which each section shows up
const BID_STREAM_FROM: usize = 1;
const ESCROW_FROM: usize = 2;
const TRANSACTION_LOG_FROM: usize = 3;

pub fn render(timeline: &Timeline, state: &PlayerState) -> String {
    let mut out = String::new();
    // writing into a `String` can't fail
    let _ = render_into(&mut out, timeline, state);
    out
}

fn render_into(out: &mut String, timeline: &Timeline, state: &PlayerState) -> std::fmt::Result {
    writeln!(out, "Live Demo")?;
    writeln!(out)?;

    writeln!(out, "Choose Scenario")?;
    for scenario in scenarios() {
        let marker = if scenario.id == state.selected_scenario { ">" } else { " " };
        writeln!(
            out,
            "{marker} {} - {} ({}, {:?} complexity)",
            scenario.name, scenario.description, scenario.estimated_duration, scenario.complexity
        )?;
    }
    let control = if state.is_running { "Running..." } else { "Start Demo" };
    writeln!(out, "[{control}] [Reset]")?;
    writeln!(out)?;

    writeln!(out, "Transaction Timeline")?;
    let markers: Vec<_> = timeline
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| match state.current_stage {
            Some(current) if i < current => format!("(✓ {})", stage.name),
            Some(current) if i == current => format!("[{} {}]", stage.icon, stage.name),
            _ => format!("( {} {} )", stage.icon, stage.name),
        })
        .collect();
    writeln!(out, "{}", markers.join(" ── "))?;

    let Some(current) = state.current_stage else {
        return Ok(());
    };
    if let Some(stage) = timeline.stages().get(current) {
        writeln!(out, "{}: {}", stage.name, stage.description)?;
    }

    if current >= BID_STREAM_FROM {
        writeln!(out)?;
        writeln!(out, "Live Bid Stream")?;
        for bid in &state.revealed_bids {
            writeln!(
                out,
                "  {:<20} ⭐ {:.1}  ⚡ {:<4} {:>8}",
                bid.agent,
                bid.rating,
                bid.response_time,
                format_amount(bid.price)
            )?;
        }
    }

    if current >= TRANSACTION_LOG_FROM {
        writeln!(out)?;
        writeln!(out, "Transaction Log")?;
        for entry in &state.revealed_log {
            writeln!(out, "  [{}] {}: {}", entry.timestamp, entry.action, entry.details)?;
        }
    }

    if current >= ESCROW_FROM {
        writeln!(out)?;
        writeln!(out, "Escrow Status")?;
        let escrowed = timeline
            .selected_bid()
            .map(|bid| format_amount(bid.price))
            .unwrap_or_else(|| format_amount(0));
        writeln!(out, "  Secure: Funds held safely")?;
        writeln!(out, "  {escrowed}: Escrowed amount")?;
        writeln!(out, "  Verified: Smart contract")?;
    }

    Ok(())
}
