use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tasktracker_core::{
    display_date, normalize_status, status_count, Task, TaskStatusFilter, STATUS_COMPLETED,
    STATUS_IN_PROGRESS, STATUS_TO_DO,
};

use crate::input::InputField;
use crate::pages::dashboard::DashboardState;
use crate::pages::login::{LoginField, LoginState};
use crate::pages::project_detail::{ProjectDetailState, TaskFormField, TaskFormState};
use crate::pages::project_form::{ProjectFormField, ProjectFormState};
use crate::pages::signup::{SignupField, SignupState};
use crate::{Route, Shell};

const ACCENT: Color = Color::Cyan;
const ERROR: Color = Color::Red;
const DIM: Color = Color::DarkGray;

pub fn draw(frame: &mut Frame, shell: &Shell) {
    match shell.route() {
        Route::Home => draw_home(frame),
        Route::Login(state) => draw_login(frame, state),
        Route::Signup(state) => draw_signup(frame, state),
        Route::ProjectForm(state) => draw_project_form(frame, state),
        Route::Dashboard(state) => draw_dashboard(frame, state),
        Route::ProjectDetail(state) => draw_project_detail(frame, state),
    }
}

fn draw_home(frame: &mut Frame) {
    let area = centered_rect(60, 40, frame.area());
    let lines = vec![
        Line::from(Span::styled(
            "Task Tracker",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Plan projects, track tasks, get things done."),
        Line::from(""),
        Line::from(Span::styled(
            "l: log in   s: sign up   Enter: continue   q: quit",
            Style::default().fg(DIM),
        )),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn draw_login(frame: &mut Frame, state: &LoginState) {
    let area = centered_rect(60, 50, frame.area());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    field(frame, rows[0], "Email", &state.email, state.focus == LoginField::Email);
    field(
        frame,
        rows[1],
        "Password",
        &state.password,
        state.focus == LoginField::Password,
    );
    status_line(frame, rows[2], state.submitting, state.error.as_deref());
    hint_line(frame, rows[3], "Enter: submit   Tab: next field   Ctrl-s: sign up   Esc: back");
}

fn draw_signup(frame: &mut Frame, state: &SignupState) {
    let area = centered_rect(60, 70, frame.area());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    field(frame, rows[0], "Name", &state.name, state.focus == SignupField::Name);
    field(frame, rows[1], "Email", &state.email, state.focus == SignupField::Email);
    field(
        frame,
        rows[2],
        "Country",
        &state.country,
        state.focus == SignupField::Country,
    );
    field(
        frame,
        rows[3],
        "Password",
        &state.password,
        state.focus == SignupField::Password,
    );
    status_line(frame, rows[4], state.submitting, state.error.as_deref());
    hint_line(frame, rows[5], "Enter: submit   Tab: next field   Ctrl-l: log in   Esc: back");
}

fn draw_project_form(frame: &mut Frame, state: &ProjectFormState) {
    let area = centered_rect(60, 50, frame.area());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    field(
        frame,
        rows[0],
        "Title",
        &state.title,
        state.focus == ProjectFormField::Title,
    );
    field(
        frame,
        rows[1],
        "Description",
        &state.description,
        state.focus == ProjectFormField::Description,
    );
    status_line(frame, rows[2], state.submitting, state.error.as_deref());
    hint_line(frame, rows[3], "Enter: create project   Tab: next field   Esc: back");
}

fn draw_dashboard(frame: &mut Frame, state: &DashboardState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let greeting = match &state.user {
        Some(user) => format!("Welcome, {}", user.name),
        None => "Welcome".to_owned(),
    };
    frame.render_widget(
        Paragraph::new(greeting).style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );

    if state.loading {
        frame.render_widget(
            Paragraph::new("Loading projects...").style(Style::default().fg(DIM)),
            rows[1],
        );
    } else if let Some(error) = &state.error {
        frame.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(ERROR)),
            rows[1],
        );
    } else if state.projects.is_empty() {
        frame.render_widget(
            Paragraph::new("No projects yet. Press n to create one.")
                .style(Style::default().fg(DIM)),
            rows[1],
        );
    } else {
        let items: Vec<ListItem> = state
            .projects
            .iter()
            .map(|project| {
                let mut spans = vec![Span::raw(project.title.clone())];
                if project.created_at.is_some() {
                    spans.push(Span::styled(
                        format!("  {}", display_date(project.created_at.as_deref())),
                        Style::default().fg(DIM),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" Projects "))
            .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(state.selected));
        frame.render_stateful_widget(list, rows[1], &mut list_state);
    }

    hint_line(
        frame,
        rows[2],
        "Enter: open   n: new   d: delete   r: refresh   l: log out   q: quit",
    );

    if let Some(project_id) = &state.confirm_delete {
        let title = state
            .projects
            .iter()
            .find(|project| &project.id == project_id)
            .map(|project| project.title.as_str())
            .unwrap_or("this project");
        confirm_overlay(frame, &format!("Delete \"{title}\" and all its tasks?"));
    }
    if let Some(alert) = &state.alert {
        alert_overlay(frame, alert);
    }
}

fn draw_project_detail(frame: &mut Frame, state: &ProjectDetailState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = match (&state.project, state.project_loading) {
        (_, true) => vec![Line::from(Span::styled(
            "Loading project...",
            Style::default().fg(DIM),
        ))],
        (Some(project), false) => {
            let mut lines = vec![Line::from(Span::styled(
                project.title.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ))];
            if let Some(description) = project.description.as_deref() {
                lines.push(Line::from(description.to_owned()));
            }
            if project.created_at.is_some() {
                lines.push(Line::from(Span::styled(
                    format!("Created {}", display_date(project.created_at.as_deref())),
                    Style::default().fg(DIM),
                )));
            }
            lines
        }
        (None, false) => vec![Line::from(Span::styled(
            state.error.clone().unwrap_or_else(|| "Project unavailable".to_owned()),
            Style::default().fg(ERROR),
        ))],
    };
    frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), rows[0]);

    frame.render_widget(Paragraph::new(filter_bar(state)), rows[1]);

    if state.tasks_loading {
        frame.render_widget(
            Paragraph::new("Loading tasks...").style(Style::default().fg(DIM)),
            rows[2],
        );
    } else if let Some(error) = &state.error {
        frame.render_widget(
            Paragraph::new(error.as_str())
                .style(Style::default().fg(ERROR))
                .wrap(Wrap { trim: true }),
            rows[2],
        );
    } else {
        let visible = state.visible_tasks();
        if visible.is_empty() {
            let empty = if state.tasks.is_empty() {
                "You don't have any tasks yet. Press a to add one."
            } else {
                "No tasks match this filter."
            };
            frame.render_widget(
                Paragraph::new(empty).style(Style::default().fg(DIM)),
                rows[2],
            );
        } else {
            let items: Vec<ListItem> = visible.iter().map(|task| task_row(task)).collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(" Tasks "))
                .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                .highlight_symbol("> ");
            let mut list_state = ListState::default().with_selected(Some(state.selected));
            frame.render_stateful_widget(list, rows[2], &mut list_state);
        }
    }

    hint_line(
        frame,
        rows[3],
        "a: add   e: edit   d: delete   f/1-4: filter   r: refresh   Esc: back   q: quit",
    );

    if let Some(form) = &state.form {
        task_form_overlay(frame, form);
    }
    if let Some(confirm) = &state.confirm_delete {
        confirm_overlay(frame, &format!("Delete task \"{}\"?", confirm.title));
    }
    if let Some(alert) = &state.alert {
        alert_overlay(frame, alert);
    }
}

fn filter_bar(state: &ProjectDetailState) -> Line<'static> {
    let filters = [
        TaskStatusFilter::All,
        TaskStatusFilter::ToDo,
        TaskStatusFilter::InProgress,
        TaskStatusFilter::Completed,
    ];
    let mut spans = Vec::new();
    for (index, filter) in filters.iter().enumerate() {
        let count = status_count(&state.tasks, filter);
        let text = format!(" [{}] {} ({}) ", index + 1, filter.label(), count);
        let style = if state.filter == *filter {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DIM)
        };
        spans.push(Span::styled(text, style));
    }
    if let TaskStatusFilter::Custom(key) = &state.filter {
        spans.push(Span::styled(
            format!(" [{key}] "),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

/// Two lines per card: title prefixed with the raw status tag (colored by
/// its normalized bucket), then the description or its fallback.
fn task_row(task: &Task) -> ListItem<'static> {
    let normalized = normalize_status(task.status.as_deref());
    let tag_style = match normalized.as_str() {
        STATUS_COMPLETED => Style::default().fg(Color::Green),
        STATUS_IN_PROGRESS => Style::default().fg(Color::Yellow),
        STATUS_TO_DO => Style::default().fg(DIM),
        _ => Style::default().fg(Color::Magenta),
    };
    let shown_status = task.status.clone().unwrap_or_else(|| "To Do".to_owned());
    let mut spans = vec![
        Span::styled(format!("[{shown_status}] "), tag_style),
        Span::raw(task.title.clone()),
    ];
    if task.created_at.is_some() {
        spans.push(Span::styled(
            format!("  {}", display_date(task.created_at.as_deref())),
            Style::default().fg(DIM),
        ));
    }
    let description = task
        .description
        .clone()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| "No description provided".to_owned());
    ListItem::new(vec![
        Line::from(spans),
        Line::from(Span::styled(
            format!("    {description}"),
            Style::default().fg(DIM),
        )),
    ])
}

fn task_form_overlay(frame: &mut Frame, form: &TaskFormState) {
    let title = if form.editing.is_some() {
        " Edit task "
    } else {
        " New task "
    };
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().borders(Borders::ALL).title(title), area);

    let inner = shrink(area, 1);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    field(frame, rows[0], "Title", &form.title, form.focus == TaskFormField::Title);
    field(
        frame,
        rows[1],
        "Description",
        &form.description,
        form.focus == TaskFormField::Description,
    );
    if form.editing.is_some() {
        let style = if form.focus == TaskFormField::Status {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(format!("Status: < {} >", form.status())).style(style),
            rows[2],
        );
    }
    status_line(frame, rows[3], form.submitting, form.error.as_deref());
    hint_line(frame, rows[4], "Enter: save   Tab: next field   Esc: cancel");
}

fn confirm_overlay(frame: &mut Frame, question: &str) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);
    let body = Paragraph::new(vec![
        Line::from(question.to_owned()),
        Line::from(""),
        Line::from(Span::styled("y: confirm   n: cancel", Style::default().fg(DIM))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(" Confirm "));
    frame.render_widget(body, area);
}

fn alert_overlay(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);
    let body = Paragraph::new(vec![
        Line::from(Span::styled(message.to_owned(), Style::default().fg(ERROR))),
        Line::from(""),
        Line::from(Span::styled("press any key", Style::default().fg(DIM))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(" Error "));
    frame.render_widget(body, area);
}

fn field(frame: &mut Frame, area: Rect, label: &str, value: &InputField, focused: bool) {
    let border_style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };
    let body = Paragraph::new(value.display()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {label} ")),
    );
    frame.render_widget(body, area);
}

fn status_line(frame: &mut Frame, area: Rect, submitting: bool, error: Option<&str>) {
    if submitting {
        frame.render_widget(
            Paragraph::new("Submitting...").style(Style::default().fg(DIM)),
            area,
        );
    } else if let Some(error) = error {
        frame.render_widget(
            Paragraph::new(error.to_owned()).style(Style::default().fg(ERROR)),
            area,
        );
    }
}

fn hint_line(frame: &mut Frame, area: Rect, hint: &str) {
    frame.render_widget(
        Paragraph::new(hint.to_owned()).style(Style::default().fg(DIM)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn shrink(area: Rect, margin: u16) -> Rect {
    Rect {
        x: area.x + margin,
        y: area.y + margin,
        width: area.width.saturating_sub(margin * 2),
        height: area.height.saturating_sub(margin * 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::project_detail::{apply, ProjectDetailEvent, ProjectDetailState};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tasktracker_core::{Project, ProjectId, TaskId};

    fn rendered_detail(state: &ProjectDetailState) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal
            .draw(|frame| draw_project_detail(frame, state))
            .expect("draw");

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for (index, cell) in buffer.content.iter().enumerate() {
            text.push_str(cell.symbol());
            if width > 0 && (index + 1) % width == 0 {
                text.push('\n');
            }
        }
        text
    }

    fn loaded_project() -> Project {
        Project {
            id: ProjectId::new("p1"),
            title: "Website refresh".to_owned(),
            description: None,
            created_at: None,
        }
    }

    fn task(status: Option<&str>, description: Option<&str>) -> Task {
        Task {
            id: TaskId::new("t1"),
            title: "Unblock deploy".to_owned(),
            description: description.map(str::to_owned),
            status: status.map(str::to_owned),
            created_at: None,
            project_id: Some(ProjectId::new("p1")),
        }
    }

    #[test]
    fn a_failed_task_fetch_shows_the_error_not_an_empty_state() {
        let mut state = ProjectDetailState::new(ProjectId::new("p1"));
        apply(&mut state, ProjectDetailEvent::ProjectLoaded(loaded_project()));
        apply(
            &mut state,
            ProjectDetailEvent::TasksFailed("Error fetching tasks.".to_owned()),
        );

        let frame = rendered_detail(&state);
        assert!(frame.contains("Error fetching tasks."));
        assert!(!frame.contains("don't have any tasks yet"));
    }

    #[test]
    fn task_cards_keep_the_raw_status_text() {
        let mut state = ProjectDetailState::new(ProjectId::new("p1"));
        apply(&mut state, ProjectDetailEvent::ProjectLoaded(loaded_project()));
        apply(
            &mut state,
            ProjectDetailEvent::TasksLoaded(vec![task(Some("Blocked"), Some("waiting on infra"))]),
        );

        let frame = rendered_detail(&state);
        assert!(frame.contains("[Blocked]"));
        assert!(frame.contains("waiting on infra"));
    }

    #[test]
    fn a_task_without_a_description_shows_the_fallback_line() {
        let mut state = ProjectDetailState::new(ProjectId::new("p1"));
        apply(&mut state, ProjectDetailEvent::ProjectLoaded(loaded_project()));
        apply(
            &mut state,
            ProjectDetailEvent::TasksLoaded(vec![task(None, None)]),
        );

        let frame = rendered_detail(&state);
        assert!(frame.contains("[To Do]"));
        assert!(frame.contains("No description provided"));
    }
}
