use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use mixkit_core::{Error, Result, Value};

type CounterFn = Arc<dyn Fn(u64) -> Value + Send + Sync>;

enum Source {
    Format(String),
    Func(CounterFn),
    Cycle(Vec<Value>),
    Counter,
    Iter(Box<dyn Iterator<Item = Value> + Send>),
}

struct State {
    source: Source,
    counter: u64,
}

/// Lazy value source advanced once per use.
///
/// Clones share the cursor, so one sequence passed to several blends (or to
/// a cycle) yields consecutive elements.
#[derive(Clone)]
pub struct Sequence {
    state: Arc<Mutex<State>>,
}

impl Sequence {
    fn from_source(source: Source) -> Self {
        Self {
            state: Arc::new(Mutex::new(State { source, counter: 0 })),
        }
    }

    /// Formats the counter into `template`; `{0}` and `{}` are replaced.
    pub fn format(template: impl Into<String>) -> Self {
        Self::from_source(Source::Format(template.into()))
    }

    /// Calls `func` with the counter (0, 1, 2, ...).
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(u64) -> Value + Send + Sync + 'static,
    {
        Self::from_source(Source::Func(Arc::new(func)))
    }

    /// Loops over `values` forever.
    pub fn cycle<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::from_source(Source::Cycle(values.into_iter().map(Into::into).collect()))
    }

    /// Yields 0, 1, 2, ...
    pub fn counter() -> Self {
        Self::from_source(Source::Counter)
    }

    /// Drains a finite iterator; fails once it is exhausted.
    pub fn from_iter<I, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: Send + 'static,
        V: Into<Value> + 'static,
    {
        Self::from_source(Source::Iter(Box::new(iter.into_iter().map(Into::into))))
    }

    /// Returns the next element and advances the shared cursor.
    pub fn next(&self) -> Result<Value> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = state.counter;
        let value = match &mut state.source {
            Source::Format(template) => {
                let counter = counter.to_string();
                Some(Value::Text(
                    template.replace("{0}", &counter).replace("{}", &counter),
                ))
            }
            Source::Func(func) => Some(func(counter)),
            Source::Cycle(values) if values.is_empty() => None,
            Source::Cycle(values) => {
                let len = values.len() as u64;
                values.get((counter % len) as usize).cloned()
            }
            Source::Counter => Some(Value::Int(counter as i64)),
            Source::Iter(iter) => iter.next(),
        };
        let value = value.ok_or_else(|| Error::GeneratorExhausted("sequence".to_string()))?;
        state.counter += 1;
        Ok(value)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let kind = match state.source {
            Source::Format(_) => "format",
            Source::Func(_) => "fn",
            Source::Cycle(_) => "cycle",
            Source::Counter => "counter",
            Source::Iter(_) => "iter",
        };
        f.debug_struct("Sequence")
            .field("kind", &kind)
            .field("counter", &state.counter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_replaces_counter() {
        let seq = Sequence::format("item{0}");
        let values: Vec<Value> = (0..3).map(|_| seq.next().expect("next")).collect();
        assert_eq!(
            values,
            vec![Value::from("item0"), Value::from("item1"), Value::from("item2")]
        );
    }

    #[test]
    fn clones_share_cursor() {
        let seq = Sequence::counter();
        let other = seq.clone();
        assert_eq!(seq.next().expect("next"), Value::Int(0));
        assert_eq!(other.next().expect("next"), Value::Int(1));
    }

    #[test]
    fn cycle_wraps_and_iter_exhausts() {
        let seq = Sequence::cycle(["a", "b"]);
        let values: Vec<Value> = (0..3).map(|_| seq.next().expect("next")).collect();
        assert_eq!(values, vec![Value::from("a"), Value::from("b"), Value::from("a")]);

        let finite = Sequence::from_iter(vec![1_i64]);
        assert_eq!(finite.next().expect("first"), Value::Int(1));
        assert!(matches!(finite.next(), Err(Error::GeneratorExhausted(_))));
    }
}
