//! Plain-text rendering of boards and tickets.

use std::fmt::Write;

use futures::future::join_all;

use kanban_core::{
    assignee_label, AttachmentId, BoardView, Column, FilterCriteria, Ticket, UserDirectory,
};

/// Marker shown in front of attachments that render inline as images.
const IMAGE_MARKER: &str = "[image]";

/// Describe the active filters in one line.
pub fn criteria_line(criteria: &FilterCriteria) -> String {
    let mut parts = Vec::new();
    if let Some(v) = criteria.work_type() {
        parts.push(format!("type={}", v));
    }
    if let Some(v) = criteria.game_name() {
        parts.push(format!("game={}", v));
    }
    if let Some(v) = criteria.team() {
        parts.push(format!("team={}", v));
    }
    if let Some(v) = criteria.search_text() {
        parts.push(format!("search={:?}", v));
    }
    if parts.is_empty() {
        "all tickets".to_string()
    } else {
        parts.join(", ")
    }
}

async fn render_column(out: &mut String, column: &Column, directory: &dyn UserDirectory) {
    let _ = writeln!(out, "== {} ({}) ==", column.status.label(), column.len());
    if column.is_empty() {
        let _ = writeln!(out, "  (empty)");
        return;
    }

    let labels = join_all(
        column
            .tickets
            .iter()
            .map(|ticket| assignee_label(ticket, directory)),
    )
    .await;

    for (ticket, assignee) in column.tickets.iter().zip(labels) {
        let tags: Vec<&str> = [&ticket.work_type, &ticket.game_name, &ticket.team]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        let _ = write!(out, "  {:<6} {}", format!("#{}", ticket.id), ticket.summary);
        if !tags.is_empty() {
            let _ = write!(out, "  [{}]", tags.join(" / "));
        }
        let _ = writeln!(out, "  @{}", assignee);
    }
}

/// Render a loaded board, one section per status column.
pub async fn render_board(view: &BoardView, directory: &dyn UserDirectory) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Board: {} ({} of {} tickets)",
        criteria_line(&view.criteria),
        view.board.total(),
        view.fetched
    );
    for column in view.board.columns() {
        let _ = writeln!(out);
        render_column(&mut out, column, directory).await;
    }
    out
}

/// Render full ticket details.
///
/// Attachments are listed once per filename with their download URL;
/// `attachment_url` maps an attachment to that URL.
pub async fn render_ticket<F>(
    ticket: &Ticket,
    directory: &dyn UserDirectory,
    attachment_url: F,
) -> String
where
    F: Fn(&AttachmentId) -> String,
{
    let mut out = String::new();
    let dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    let _ = writeln!(out, "#{} {}", ticket.id, ticket.summary);
    let _ = writeln!(out, "Status:     {}", ticket.status);
    let _ = writeln!(out, "Work type:  {}", dash(&ticket.work_type));
    let _ = writeln!(out, "Game:       {}", dash(&ticket.game_name));
    let _ = writeln!(out, "Project:    {}", dash(&ticket.project));
    let _ = writeln!(out, "Team:       {}", dash(&ticket.team));
    let _ = writeln!(
        out,
        "Assignee:   {}",
        assignee_label(ticket, directory).await
    );
    if let Some(created) = ticket.created_at {
        let _ = writeln!(out, "Created:    {}", created.format("%Y-%m-%d %H:%M"));
    }

    if !ticket.description.trim().is_empty() {
        let _ = writeln!(out, "Description:");
        for line in ticket.description.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    let attachments = ticket.unique_attachments();
    if attachments.is_empty() {
        let _ = writeln!(out, "Attachments: none");
    } else {
        let _ = writeln!(out, "Attachments:");
        for attachment in attachments {
            let marker = if attachment.is_image() {
                format!("{} ", IMAGE_MARKER)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "  {}{} (id {})  {}",
                marker,
                attachment.filename,
                attachment.id,
                attachment_url(&attachment.id)
            );
        }
    }
    out
}

/// Render the known game names, one per line.
pub fn render_game_names(names: &[String]) -> String {
    if names.is_empty() {
        return "No game names known\n".to_string();
    }
    names.iter().map(|name| format!("{}\n", name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::testing::fixtures;
    use kanban_core::{
        attachment_url, FilterEngine, StaticUserDirectory, StatusBoard, TicketStatus, User,
    };

    fn directory() -> StaticUserDirectory {
        StaticUserDirectory::new([User::new("42", "Ada Lovelace")])
    }

    fn view(criteria: FilterCriteria) -> BoardView {
        let tickets = FilterEngine::new(&criteria).apply(fixtures::sample_tickets());
        BoardView {
            seq: 1,
            criteria,
            fetched: fixtures::sample_tickets().len(),
            board: StatusBoard::partition(tickets),
        }
    }

    #[test]
    fn test_criteria_line() {
        assert_eq!(criteria_line(&FilterCriteria::new()), "all tickets");
        let criteria = FilterCriteria::new()
            .with_work_type("Bug")
            .with_search_text(" login ");
        assert_eq!(criteria_line(&criteria), "type=Bug, search=\"login\"");
    }

    #[tokio::test]
    async fn test_render_board_lists_every_column() {
        let out = render_board(&view(FilterCriteria::new()), &directory()).await;

        for status in TicketStatus::ALL {
            assert!(out.contains(&format!("== {} (", status.label())), "{}", out);
        }
        assert!(out.starts_with("Board: all tickets (5 of 5 tickets)"));
        assert!(out.contains("== Suggestion (0) ==\n  (empty)"));
        assert!(out.contains("#1     Fix login bug  [Bug / Space Game / Core]  @Ada Lovelace"));
        assert!(out.contains("@Unassigned"));
    }

    #[tokio::test]
    async fn test_render_board_with_filter_counts() {
        let out = render_board(
            &view(FilterCriteria::new().with_game_name("Racer")),
            &directory(),
        )
        .await;
        assert!(out.starts_with("Board: game=Racer (3 of 5 tickets)"));
        assert!(!out.contains("Fix login bug"));
    }

    #[tokio::test]
    async fn test_render_ticket_dedups_and_marks_images() {
        let mut ticket = fixtures::ticket_with_attachments(
            7,
            "With files",
            &["shot.PNG", "crash.log", "shot.PNG"],
        );
        ticket.assignee = "99".to_string();
        ticket.description = "Line one\nLine two".to_string();

        let out = render_ticket(&ticket, &directory(), |id| {
            attachment_url("http://localhost:5000", id)
        })
        .await;

        assert!(out.starts_with("#7 With files\nStatus:     To Do\n"));
        assert!(out.contains("Assignee:   99\n"));
        assert!(out.contains("Description:\n  Line one\n  Line two\n"));
        assert!(out.contains(
            "  [image] shot.PNG (id 700)  http://localhost:5000/attachment/700\n"
        ));
        assert!(out.contains("  crash.log (id 701)  http://localhost:5000/attachment/701\n"));
        assert_eq!(out.matches("shot.PNG").count(), 1);
    }

    #[tokio::test]
    async fn test_render_ticket_without_attachments() {
        let ticket = fixtures::ticket(3, "Bare", "weird-status");
        let out = render_ticket(&ticket, &directory(), |_| String::new()).await;
        assert!(out.contains("Game:       -\n"));
        assert!(out.contains("Assignee:   Unassigned\n"));
        assert!(out.ends_with("Attachments: none\n"));
    }

    #[test]
    fn test_render_game_names() {
        assert_eq!(render_game_names(&[]), "No game names known\n");
        let names = vec!["Racer".to_string(), "Space Game".to_string()];
        assert_eq!(render_game_names(&names), "Racer\nSpace Game\n");
    }
}
