#![forbid(unsafe_code)]

//! Todo demo: one state tree, two combined slices, a rendering subscriber,
//! and a JSONL event trace printed at exit.
//!
//! Run with `RUST_LOG=trace` to watch every dispatch and notification.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use statera::trace::{Recorder, write_events};
use statera::{Event, Signal, Store, combine_reducers};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    text: String,
    completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Filter {
    ShowAll,
    ShowCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum TodoEvent {
    #[serde(rename = "ADD_TODO")]
    AddTodo { text: String },
    #[serde(rename = "TOGGLE_TODO")]
    ToggleTodo { index: usize },
    #[serde(rename = "SET_VISIBILITY_FILTER")]
    SetVisibilityFilter { filter: Filter },
}

impl Event for TodoEvent {
    fn kind(&self) -> &str {
        match self {
            Self::AddTodo { .. } => "ADD_TODO",
            Self::ToggleTodo { .. } => "TOGGLE_TODO",
            Self::SetVisibilityFilter { .. } => "SET_VISIBILITY_FILTER",
        }
    }
}

#[derive(Debug)]
struct AppState {
    todos: Rc<Vec<Todo>>,
    visibility_filter: Rc<Filter>,
}

fn todos(prior: Option<Rc<Vec<Todo>>>, signal: Signal<'_, TodoEvent>) -> Rc<Vec<Todo>> {
    let state = prior.unwrap_or_default();
    match signal {
        Signal::Event(TodoEvent::AddTodo { text }) => {
            let mut next = (*state).clone();
            next.push(Todo {
                text: text.clone(),
                completed: false,
            });
            Rc::new(next)
        }
        Signal::Event(TodoEvent::ToggleTodo { index }) => {
            let mut next = (*state).clone();
            if let Some(todo) = next.get_mut(*index) {
                todo.completed = !todo.completed;
            }
            Rc::new(next)
        }
        _ => state,
    }
}

fn visibility_filter(prior: Option<Rc<Filter>>, signal: Signal<'_, TodoEvent>) -> Rc<Filter> {
    let state = prior.unwrap_or_else(|| Rc::new(Filter::ShowAll));
    match signal {
        Signal::Event(TodoEvent::SetVisibilityFilter { filter }) => Rc::new(*filter),
        _ => state,
    }
}

fn render(state: &AppState) {
    let visible: Vec<&Todo> = state
        .todos
        .iter()
        .filter(|todo| match *state.visibility_filter {
            Filter::ShowAll => true,
            Filter::ShowCompleted => todo.completed,
        })
        .collect();
    info!(
        filter = ?state.visibility_filter,
        total = state.todos.len(),
        visible = visible.len(),
        "render"
    );
    for todo in visible {
        let mark = if todo.completed { 'x' } else { ' ' };
        println!("[{mark}] {}", todo.text);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let root = combine_reducers!(AppState<TodoEvent> {
        todos: todos,
        visibility_filter: visibility_filter,
    })?;
    let store = Store::new(root);

    // The rendering layer: reads a full snapshot on every notification.
    let view = store.clone();
    let subscription = store.subscribe(move || render(&view.state()));

    let recorder = Recorder::new(store.clone());
    recorder.dispatch(TodoEvent::AddTodo {
        text: "Eat food".into(),
    })?;
    recorder.dispatch(TodoEvent::AddTodo {
        text: "Walk dog".into(),
    })?;
    recorder.dispatch(TodoEvent::ToggleTodo { index: 0 })?;
    recorder.dispatch(TodoEvent::SetVisibilityFilter {
        filter: Filter::ShowCompleted,
    })?;

    drop(subscription);

    println!("--- event trace (replayable) ---");
    let mut trace = Vec::new();
    write_events(&recorder.take_events(), &mut trace)?;
    print!("{}", String::from_utf8(trace)?);

    Ok(())
}
