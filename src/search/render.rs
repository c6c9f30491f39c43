//! Plain-text rendering of search output for the command line

use crate::catalog::{Appendix, CoverageStats};
use crate::search::highlight::Segment;
use crate::search::outputs::{DatasetStatsOutput, EmptyReason, RecordDetails, SearchOutput};
use crate::search::references::ReferenceUnit;

/// Render matched segments wrapped in brackets
pub fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.matched {
                format!("[{}]", segment.text)
            } else {
                segment.text.clone()
            }
        })
        .collect()
}

/// Render reference units separated by commas, or `-` when there are none
pub fn render_units(units: &[ReferenceUnit]) -> String {
    if units.is_empty() {
        return "-".to_string();
    }
    units
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn empty_message(reason: EmptyReason) -> &'static str {
    match reason {
        EmptyReason::QueryTooShort => "Enter at least 2 characters to search",
        EmptyReason::NoMatches => "Nothing found",
        EmptyReason::NoFacetsSelected => "All appendix filters are off",
        EmptyReason::FilteredOut => "No matches cite the selected appendices",
    }
}

fn appendix_lines(record: &RecordDetails) -> String {
    [
        (Appendix::One, &record.appendix1),
        (Appendix::Two, &record.appendix2),
        (Appendix::Three, &record.appendix3),
    ]
    .into_iter()
    .map(|(appendix, units)| {
        format!(
            "    {} ({}): {}\n",
            appendix,
            appendix.title(),
            render_units(units)
        )
    })
    .collect()
}

pub fn render_search(output: &SearchOutput) -> String {
    let mut out = String::new();

    if !output.description.is_empty() {
        out.push_str(&format!("{}\n", output.description));
    }

    if let Some(reason) = output.empty_reason {
        out.push_str(empty_message(reason));
        out.push('\n');
        return out;
    }

    for row in &output.results {
        out.push_str(&format!(
            "\n{}  {}\n",
            render_segments(&row.code_segments),
            render_segments(&row.name_segments)
        ));
        out.push_str(&appendix_lines(&row.record));
    }

    if output.truncated {
        out.push_str(&format!(
            "\nshown {} of {}\n",
            output.results.len(),
            output.filtered_count
        ));
    }

    out
}

pub fn render_record(record: &RecordDetails) -> String {
    let mut out = format!("{}  {}\n    {}\n", record.code, record.name, record.code_url);
    out.push_str(&appendix_lines(record));
    out
}

fn coverage_line(label: &str, count: usize, coverage: &CoverageStats) -> String {
    format!(
        "{label:<22}{count:>8}  {:>6.2}%\n",
        coverage.percent(count)
    )
}

pub fn render_stats(stats: &DatasetStatsOutput) -> String {
    let coverage = &stats.coverage;
    let mut out = format!("Records: {}\n", coverage.total);
    for appendix in Appendix::ALL {
        out.push_str(&coverage_line(
            &format!("{} ({})", appendix, appendix.title()),
            coverage.for_appendix(appendix),
            coverage,
        ));
    }
    out.push_str(&coverage_line("any appendix", coverage.any, coverage));
    out.push_str(&coverage_line("no appendix", coverage.none, coverage));
    out.push_str(&format!(
        "Points: {} / {} / {}\n",
        stats.appendix1_points, stats.appendix2_points, stats.appendix3_points
    ));
    if let Some(snapshot) = &stats.snapshot {
        out.push_str(&format!("Built at: {}\n", snapshot.built_at.to_rfc3339()));
    }
    out
}
