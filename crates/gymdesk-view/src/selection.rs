// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectAllState {
    All,
    None,
    Some,
}

impl SelectAllState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::None => "none",
            Self::Some => "some",
        }
    }
}

/// Selection summary over the displayed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionAggregate {
    pub selected: usize,
    pub total: usize,
}

impl SelectionAggregate {
    pub const fn new(selected: usize, total: usize) -> Self {
        Self { selected, total }
    }

    pub const fn state(self) -> SelectAllState {
        if self.total == 0 || self.selected == 0 {
            SelectAllState::None
        } else if self.selected == self.total {
            SelectAllState::All
        } else {
            SelectAllState::Some
        }
    }
}

/// Aggregate cell shared between a controller and the listeners it
/// subscribes to displayed rows.
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectionCounter {
    cell: Rc<Cell<SelectionAggregate>>,
}

impl SelectionCounter {
    pub(crate) fn get(&self) -> SelectionAggregate {
        self.cell.get()
    }

    pub(crate) fn reset(&self, aggregate: SelectionAggregate) {
        self.cell.set(aggregate);
    }

    pub(crate) fn listener(&self) -> impl Fn(bool) + 'static {
        let cell = Rc::clone(&self.cell);
        move |selected| {
            let mut aggregate = cell.get();
            if selected {
                aggregate.selected = aggregate.selected.saturating_add(1);
            } else {
                aggregate.selected = aggregate.selected.saturating_sub(1);
            }
            cell.set(aggregate);
        }
    }
}
