//! Index-addressable, lazily produced unit sequences.

use crate::{FlowError, LayoutError};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Produces the units of a [`BufferedDataSource`] one at a time, in order.
pub trait UnitProducer<T> {
    /// Returns the next unit, or `None` once the sequence has ended.
    fn produce(&mut self) -> Result<Option<T>, FlowError>;
}

/// A view over a sequence of units starting at some position.
///
/// Every call may trigger lazy production, and production may ask for a restart, hence
/// the `Result` on every query.
pub trait SplitPointDataSource<T>: Sized {
    /// The unit at `index`. Fails if the source has fewer units.
    fn get(&self, index: usize) -> Result<Rc<T>, FlowError>;

    /// Units `[0, to)`, or all of them if there are fewer.
    fn head(&self, to: usize) -> Result<Vec<Rc<T>>, FlowError>;

    /// All units of this view. Forces production to the end.
    fn remaining(&self) -> Result<Vec<Rc<T>>, FlowError>;

    /// A view starting at `from`, sharing already produced units.
    fn tail(&self, from: usize) -> Self;

    fn has_element_at(&self, index: usize) -> Result<bool, FlowError>;

    /// Number of units, counting no further than `limit`.
    fn size(&self, limit: usize) -> Result<usize, FlowError>;

    fn is_empty(&self) -> Result<bool, FlowError> {
        Ok(!self.has_element_at(0)?)
    }

    fn split(&self, at: usize) -> Result<(Vec<Rc<T>>, Self), FlowError> {
        Ok((self.head(at)?, self.tail(at)))
    }
}

struct Buffer<'a, T> {
    items: Vec<Rc<T>>,
    producer: Box<dyn UnitProducer<T> + 'a>,
    exhausted: bool,
}

impl<T> Buffer<'_, T> {
    fn fill_to(&mut self, len: usize) -> Result<(), FlowError> {
        while !self.exhausted && self.items.len() < len {
            match self.producer.produce()? {
                Some(item) => self.items.push(Rc::new(item)),
                None => self.exhausted = true,
            }
        }
        Ok(())
    }
}

struct Exhausted;

impl<T> UnitProducer<T> for Exhausted {
    fn produce(&mut self) -> Result<Option<T>, FlowError> {
        Ok(None)
    }
}

/// A [`SplitPointDataSource`] backed by a shared buffer.
///
/// Clones and tails share the buffer, so a unit is produced exactly once no matter how
/// many views look at it.
pub struct BufferedDataSource<'a, T> {
    buffer: Rc<RefCell<Buffer<'a, T>>>,
    offset: usize,
}

impl<T> Clone for BufferedDataSource<'_, T> {
    fn clone(&self) -> Self {
        Self {
            buffer: Rc::clone(&self.buffer),
            offset: self.offset,
        }
    }
}

impl<T> fmt::Debug for BufferedDataSource<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.buffer.borrow();
        f.debug_struct("BufferedDataSource")
            .field("offset", &self.offset)
            .field("produced", &buffer.items.len())
            .field("exhausted", &buffer.exhausted)
            .finish()
    }
}

impl<'a, T> BufferedDataSource<'a, T> {
    pub fn new(producer: impl UnitProducer<T> + 'a) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(Buffer {
                items: Vec::new(),
                producer: Box::new(producer),
                exhausted: false,
            })),
            offset: 0,
        }
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(Buffer {
                items: items.into_iter().map(Rc::new).collect(),
                producer: Box::new(Exhausted),
                exhausted: true,
            })),
            offset: 0,
        }
    }

    /// Total number of units produced so far, across all views of the buffer.
    pub fn produced(&self) -> usize {
        self.buffer.borrow().items.len()
    }

    fn fetch(&self, index: usize) -> Result<Option<Rc<T>>, FlowError> {
        let absolute = self.offset + index;
        let mut buffer = self.buffer.borrow_mut();
        buffer.fill_to(absolute + 1)?;
        Ok(buffer.items.get(absolute).cloned())
    }

    fn range(&self, to: Option<usize>) -> Result<Vec<Rc<T>>, FlowError> {
        let mut buffer = self.buffer.borrow_mut();
        let end = match to {
            Some(to) => {
                let end = self.offset.saturating_add(to);
                buffer.fill_to(end)?;
                end.min(buffer.items.len())
            }
            None => {
                buffer.fill_to(usize::MAX)?;
                buffer.items.len()
            }
        };
        let start = self.offset.min(end);
        Ok(buffer.items[start..end].to_vec())
    }
}

impl<T> SplitPointDataSource<T> for BufferedDataSource<'_, T> {
    fn get(&self, index: usize) -> Result<Rc<T>, FlowError> {
        self.fetch(index)?.ok_or_else(|| {
            FlowError::Layout(LayoutError::Generic(format!(
                "No unit at index {index} (offset {})",
                self.offset
            )))
        })
    }

    fn head(&self, to: usize) -> Result<Vec<Rc<T>>, FlowError> {
        self.range(Some(to))
    }

    fn remaining(&self) -> Result<Vec<Rc<T>>, FlowError> {
        self.range(None)
    }

    fn tail(&self, from: usize) -> Self {
        Self {
            buffer: Rc::clone(&self.buffer),
            offset: self.offset + from,
        }
    }

    fn has_element_at(&self, index: usize) -> Result<bool, FlowError> {
        Ok(self.fetch(index)?.is_some())
    }

    fn size(&self, limit: usize) -> Result<usize, FlowError> {
        let mut buffer = self.buffer.borrow_mut();
        buffer.fill_to(self.offset.saturating_add(limit))?;
        Ok(buffer.items.len().saturating_sub(self.offset).min(limit))
    }
}
