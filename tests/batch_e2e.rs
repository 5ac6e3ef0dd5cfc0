//! Whole-pipeline runs against a scripted portal.
//!
//! Nodes are labelled with the first candidate of each set in the embedded
//! profile, so these runs exercise the shipped query configuration.

use std::sync::{Arc, Mutex};

use action_flow::BatchStatus;
use action_primitives::testing::{DomState, FakeDom, NodeSpec};
use action_primitives::{BrowserSession, Query};
use evalfill_cli::{AppConfig, AppError, Pipeline};
use perceiver_state::PageState;

const HOME: &str = "https://portal.test/index.cfm?event=studentPortal";
const LIST: &str = "https://portal.test/index.cfm?event=evaluateOnline:evaluate";
const DETAIL: &str = "https://portal.test/index.cfm?event=evaluateOnline:evaluateResponse";

#[derive(Clone)]
struct Row {
    subject: &'static str,
    teacher: &'static str,
    /// Detail form renders without its submit control
    broken: bool,
}

/// Server-side state shared by every render
#[derive(Clone)]
struct Portal {
    config: Arc<AppConfig>,
    rows: Arc<Mutex<Vec<Row>>>,
    submitted: Arc<Mutex<Vec<String>>>,
}

impl Portal {
    fn new(config: &AppConfig, rows: Vec<Row>) -> Self {
        Self {
            config: Arc::new(config.clone()),
            rows: Arc::new(Mutex::new(rows)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn first(queries: &[Query]) -> Query {
        queries[0].clone()
    }

    fn pending(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    /// Navigation bar present on every page
    fn chrome(&self, state: &mut DomState, logged_in: bool) {
        let root = state.root();
        state.clear_children(root);
        if !logged_in {
            state.append(
                root,
                NodeSpec::new("input").label(Self::first(&self.config.detector.login_page.queries)),
            );
            return;
        }
        state.append(
            root,
            NodeSpec::new("a")
                .text("account")
                .label(Self::first(&self.config.detector.login_success.queries)),
        );
        let menu = state.append(
            root,
            NodeSpec::new("div").label(Self::first(&self.config.navigator.menu.queries)),
        );
        let portal = self.clone();
        state.on_click(
            menu,
            Arc::new(move |state: &mut DomState| {
                state.push_url(LIST);
                portal.render_list(state);
            }),
        );
    }

    fn render_home(&self, state: &mut DomState) {
        self.chrome(state, true);
    }

    fn render_list(&self, state: &mut DomState) {
        self.chrome(state, true);
        let root = state.root();
        let container = state.append(
            root,
            NodeSpec::new("div").label(Self::first(&self.config.form.return_signals.list_container.queries)),
        );

        let rows = self.rows.lock().unwrap().clone();
        if rows.is_empty() {
            state.append(
                container,
                NodeSpec::new("div")
                    .text("太棒了")
                    .label(Self::first(&self.config.detector.queue_exhausted.queries)),
            );
            return;
        }

        let extractor = &self.config.extractor;
        let layout = &extractor.layout;
        let table = state.append(
            container,
            NodeSpec::new("table").label(Self::first(&extractor.table.queries)),
        );
        for (index, row) in rows.iter().enumerate() {
            let tr = state.append(
                table,
                NodeSpec::new("tr").label(Self::first(&extractor.rows.queries)),
            );
            let cells = [
                (layout.sequence.clone(), (index + 1).to_string()),
                (layout.group.clone(), "Computing".to_string()),
                (
                    layout.combined.clone(),
                    format!("{} - {}", row.subject, row.teacher),
                ),
                (layout.weight.clone(), "3.00".to_string()),
                (layout.period.clone(), "01-16".to_string()),
            ];
            for (query, text) in cells {
                state.append(tr, NodeSpec::new("td").text(text).label(query));
            }
            let action_cell = state.append(tr, NodeSpec::new("td").label(layout.action_cell.clone()));
            let action = state.append(
                action_cell,
                NodeSpec::new("a")
                    .text("网上评价")
                    .label(Self::first(&extractor.action.queries)),
            );
            let portal = self.clone();
            let row = row.clone();
            state.on_click(
                action,
                Arc::new(move |state: &mut DomState| {
                    state.push_url(DETAIL);
                    portal.render_detail(state, &row);
                }),
            );
        }
    }

    fn render_detail(&self, state: &mut DomState, row: &Row) {
        self.chrome(state, true);
        let root = state.root();
        let form = &self.config.form;
        let sheet = state.append(
            root,
            NodeSpec::new("table").label(Self::first(&form.form_root.queries)),
        );
        let choice = match &form.answers {
            tool_fill_form::AnswerPolicyConfig::Preferred { choices } => Self::first(&choices.queries),
            other => panic!("unexpected answer policy {:?}", other),
        };
        for _ in 0..4 {
            let group = state.append(
                sheet,
                NodeSpec::new("td").label(Self::first(&form.question_groups.queries)),
            );
            state.append(group, NodeSpec::new("a").label(choice.clone()));
        }
        state.append(
            root,
            NodeSpec::new("textarea").label(Self::first(&form.comment_field.queries)),
        );
        if row.broken {
            return;
        }

        let submit = state.append(
            root,
            NodeSpec::new("a")
                .label(Self::first(&form.submit.queries))
                .disabled()
                .occluded(),
        );
        let portal = self.clone();
        let subject = row.subject;
        state.on_click(
            submit,
            Arc::new(move |state: &mut DomState| {
                portal.rows.lock().unwrap().retain(|row| row.subject != subject);
                portal.submitted.lock().unwrap().push(subject.to_string());
                state.push_url(LIST);
                portal.render_list(state);
            }),
        );
    }

    /// Mount the portal on a fresh browser tab
    fn mount(&self) -> FakeDom {
        let dom = FakeDom::new("about:blank");
        let portal = self.clone();
        dom.on_navigate(move |state| portal.render_home(state));
        let portal = self.clone();
        dom.on_back(move |state| portal.render_list(state));
        dom
    }
}

fn config() -> AppConfig {
    let mut config = AppConfig::embedded().unwrap();
    config.portal.home_url = HOME.into();
    config.portal.initial_settle_ms = 0;
    config.navigator.home_url = Some(HOME.into());
    config.wait.poll_interval_ms = 5;
    config.detector.signal_timeout_ms = 50;
    config.navigator.menu_timeout_ms = 100;
    config.navigator.arrival_timeout_ms = 100;
    config.navigator.back_settle_ms = 0;
    config.navigator.load_settle_ms = 0;
    config.extractor.table_timeout_ms = 100;
    config.extractor.relocate_timeout_ms = 100;
    config.form.timeouts.form_ms = 100;
    config.form.timeouts.element_ms = 50;
    config.form.timeouts.answer_pause_ms = 0;
    config.form.timeouts.confirm_ms = 100;
    config.batch.success_settle_ms = 0;
    config.validate().unwrap();
    config
}

fn row(subject: &'static str, teacher: &'static str) -> Row {
    Row {
        subject,
        teacher,
        broken: false,
    }
}

#[tokio::test]
async fn drains_every_pending_item() {
    let config = config();
    let portal = Portal::new(&config, vec![row("Algorithms", "Dr. X"), row("Networks", "Dr. Y")]);
    let dom = portal.mount();
    let pipeline = Pipeline::new(config).unwrap();

    let report = pipeline.run(&dom, false).await.unwrap();

    assert_eq!(report.status, BatchStatus::Drained);
    assert_eq!(report.result.succeeded, 2);
    assert_eq!(report.result.failed, 0);
    assert_eq!(report.result.attempts, 2);
    assert_eq!(portal.submitted(), vec!["Algorithms", "Networks"]);
    assert_eq!(portal.pending(), 0);

    let remaining = pipeline.list_queue(&dom).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn lists_queue_in_table_order() {
    let config = config();
    let portal = Portal::new(&config, vec![row("Algorithms", "Dr. X"), row("Networks", "Dr. Y")]);
    let dom = portal.mount();
    let pipeline = Pipeline::new(config).unwrap();

    pipeline.open_portal(&dom).await.unwrap();
    assert_eq!(
        pipeline.check_login(&dom, false).await.unwrap(),
        PageState::Authenticated
    );
    let items = pipeline.list_queue(&dom).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].sequence_label, "1");
    assert_eq!(items[0].subject_name, "Algorithms");
    assert_eq!(items[0].counterparty_name, "Dr. X");
    assert_eq!(items[0].weight, "3.00");
    assert_eq!(items[1].subject_name, "Networks");
    assert!(portal.submitted().is_empty());
}

#[tokio::test]
async fn stuck_item_fails_until_the_ceiling() {
    let mut config = config();
    config.batch.max_attempts = 3;
    let broken = Row {
        broken: true,
        ..row("Algorithms", "Dr. X")
    };
    let portal = Portal::new(&config, vec![broken, row("Networks", "Dr. Y")]);
    let dom = portal.mount();
    let pipeline = Pipeline::new(config).unwrap();

    let report = pipeline.run(&dom, false).await.unwrap();

    assert_eq!(report.status, BatchStatus::AttemptsExhausted);
    assert_eq!(report.result.succeeded, 0);
    assert_eq!(report.result.failed, 3);
    assert_eq!(dom.back_calls(), 3);
    assert_eq!(portal.pending(), 2);
}

#[tokio::test]
async fn login_page_stops_the_run() {
    let config = config();
    let portal = Portal::new(&config, vec![row("Algorithms", "Dr. X")]);
    let dom = FakeDom::new("about:blank");
    let login = portal.clone();
    dom.on_navigate(move |state| login.chrome(state, false));
    let pipeline = Pipeline::new(config).unwrap();

    let err = pipeline.run(&dom, true).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::NotAuthenticated {
            state: PageState::Unauthenticated
        }
    ));
    assert_eq!(dom.current_url().await.unwrap(), HOME);
    assert_eq!(portal.pending(), 1);
}

#[tokio::test]
async fn unknown_login_state_needs_explicit_override() {
    let config = config();
    let dom = FakeDom::new("about:blank");
    let pipeline = Pipeline::new(config).unwrap();

    pipeline.open_portal(&dom).await.unwrap();
    let err = pipeline.check_login(&dom, false).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::NotAuthenticated {
            state: PageState::Unknown
        }
    ));
    assert_eq!(
        pipeline.check_login(&dom, true).await.unwrap(),
        PageState::Unknown
    );
}
