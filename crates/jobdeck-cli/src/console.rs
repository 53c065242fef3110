//! Console rendering of the derived board — the stand-in for the
//! external rendering layer.

use jobdeck_core::view::BoardView;

/// Render the board as plain text, one block per column.
///
/// Archived and soft-deleted cards are filtered here, at the rendering
/// boundary; the canonical collection keeps them. Dimmed cards (search
/// non-matches) render with a hollow bullet.
pub fn render(view: &BoardView) -> String {
  let mut out = String::new();
  for column in &view.columns {
    let visible: Vec<_> = column
      .cards
      .iter()
      .filter(|cv| !cv.card.is_archived && !cv.card.is_deleted)
      .collect();

    out.push_str(&format!(
      "{} ({})\n",
      column.stage.display_name(),
      visible.len()
    ));
    for cv in visible {
      out.push_str(if cv.dimmed { "  . " } else { "  * " });
      out.push_str(&cv.card.title);
      if let Some(company) = &cv.card.company {
        out.push_str(&format!(" | {company}"));
      }
      if let Some(date) = &cv.card.date {
        out.push_str(&format!(" ({date})"));
      }
      out.push('\n');
    }
    out.push('\n');
  }
  out
}
