// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use gymdesk_app::{EntityId, SortDirection};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::bus::{DataEvent, EventBus};
use crate::notifier::{SelectionFlag, Subscription};
use crate::record::{Record, Row};
use crate::screens::{CategoryFilter, Screen, SortSpec};
use crate::search::{
    SearchCandidate, SearchDispatcher, SearchJob, SearchOutcome, SearchPoll, SearchStats,
    ThreadDispatcher, matching_ids,
};
use crate::selection::{SelectionAggregate, SelectionCounter};

pub type RecordId<S> = <<S as Screen>::Record as Record>::Id;
pub type SharedRow<S> = Rc<Row<<S as Screen>::Record>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Empty,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
    Ignored,
}

#[derive(Debug)]
struct ListenerHandle {
    flag: SelectionFlag,
    subscription: Subscription,
}

impl ListenerHandle {
    fn release(&self) -> bool {
        self.flag.unsubscribe(self.subscription)
    }
}

/// Source → Filtered → Displayed pipeline for one list screen, plus the
/// selection aggregate over Displayed.
///
/// The controller is the only owner of the per-row selection listeners: a
/// row is listened to exactly while it is displayed.
pub struct CollectionController<S: Screen> {
    state: ControllerState,
    source: Vec<SharedRow<S>>,
    filtered: Vec<SharedRow<S>>,
    displayed: Vec<SharedRow<S>>,
    category: CategoryFilter<S::Category>,
    sort: SortSpec<S::SortKey>,
    search_text: String,
    listeners: HashMap<RecordId<S>, ListenerHandle>,
    counter: SelectionCounter,
    generation: u64,
    searching: bool,
    stats: SearchStats,
    dispatcher: Box<dyn SearchDispatcher<RecordId<S>>>,
    outcome_tx: Sender<SearchOutcome<RecordId<S>>>,
    outcome_rx: Receiver<SearchOutcome<RecordId<S>>>,
    bus: EventBus,
}

impl<S: Screen> CollectionController<S> {
    pub fn new(bus: EventBus, dispatcher: impl SearchDispatcher<RecordId<S>> + 'static) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            state: ControllerState::Empty,
            source: Vec::new(),
            filtered: Vec::new(),
            displayed: Vec::new(),
            category: CategoryFilter::All,
            sort: S::default_sort(),
            search_text: String::new(),
            listeners: HashMap::new(),
            counter: SelectionCounter::default(),
            generation: 0,
            searching: false,
            stats: SearchStats::default(),
            dispatcher: Box::new(dispatcher),
            outcome_tx,
            outcome_rx,
            bus,
        }
    }

    pub fn with_latency(bus: EventBus, latency: Duration) -> Self {
        Self::new(bus, ThreadDispatcher::new(latency))
    }

    /// Replaces the dataset and resets category, sort and search to their
    /// defaults.
    pub fn load(&mut self, records: Vec<S::Record>) {
        self.supersede_search();
        self.release_all_listeners();

        let mut seen = HashSet::with_capacity(records.len());
        let mut source = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id();
            if !seen.insert(id) {
                tracing::warn!(
                    screen = S::KIND.as_str(),
                    id = id.get(),
                    "duplicate record id in load; keeping the first"
                );
                continue;
            }
            source.push(Rc::new(Row::new(record)));
        }

        self.source = source;
        self.category = CategoryFilter::All;
        self.sort = S::default_sort();
        self.search_text.clear();
        self.state = ControllerState::Loaded;

        self.rebuild_filtered();
        self.displayed = self.filtered.clone();
        self.sync_listeners();
        self.recount();

        tracing::debug!(
            screen = S::KIND.as_str(),
            rows = self.source.len(),
            "screen loaded"
        );
        self.bus.publish(DataEvent::Loaded {
            screen: S::KIND,
            count: self.source.len(),
        });
    }

    /// Re-derives Filtered under `category` and the active sort, then
    /// re-applies the active search text.
    pub fn set_category_filter(&mut self, category: CategoryFilter<S::Category>) {
        if !self.is_loaded() {
            return;
        }
        self.supersede_search();
        self.category = category;
        self.rebuild_filtered();
        self.rebuild_displayed();
        tracing::debug!(
            screen = S::KIND.as_str(),
            category = ?category,
            filtered = self.filtered.len(),
            displayed = self.displayed.len(),
            "category filter applied"
        );
    }

    /// Stable re-sort of Filtered; Displayed keeps the new order.
    pub fn set_sort(&mut self, key: S::SortKey, direction: SortDirection) {
        if !self.is_loaded() {
            return;
        }
        self.supersede_search();
        self.sort = SortSpec { key, direction };
        self.sort_filtered();
        self.rebuild_displayed();
        tracing::debug!(
            screen = S::KIND.as_str(),
            key = ?key,
            direction = direction.as_str(),
            "sort applied"
        );
    }

    /// Starts a search over Filtered. Blank text resets Displayed at once;
    /// anything else resolves through the dispatcher and is applied by
    /// [`Self::poll_search`] only if no newer operation has happened since.
    pub fn search(&mut self, text: &str) {
        if !self.is_loaded() {
            return;
        }
        self.supersede_search();

        if text.trim().is_empty() {
            self.search_text.clear();
            self.displayed = self.filtered.clone();
            self.sync_listeners();
            self.recount();
            return;
        }

        self.search_text = text.to_owned();
        let job = SearchJob {
            generation: self.generation,
            query: text.trim().to_owned(),
            candidates: self.candidates(),
        };
        self.stats.issued += 1;
        match self.dispatcher.dispatch(job, self.outcome_tx.clone()) {
            Ok(()) => {
                self.searching = true;
                tracing::trace!(
                    screen = S::KIND.as_str(),
                    generation = self.generation,
                    "search dispatched"
                );
            }
            Err(error) => {
                tracing::warn!(
                    screen = S::KIND.as_str(),
                    error = %format!("{error:#}"),
                    "search dispatch failed; matching inline"
                );
                self.rebuild_displayed();
                self.stats.committed += 1;
            }
        }
    }

    /// Applies any resolved search without blocking.
    pub fn poll_search(&mut self) -> SearchPoll {
        let committed = self.drain_outcomes();
        self.poll_result(committed)
    }

    /// Blocks until the in-flight search (if any) has been applied.
    pub fn wait_for_search(&mut self, timeout: Duration) -> Result<SearchPoll> {
        let deadline = Instant::now() + timeout;
        let mut committed = self.drain_outcomes();
        while self.searching {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.outcome_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(matched) = self.accept_outcome(outcome) {
                        committed = Some(matched);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    bail!(
                        "search {:?} on {} did not resolve within {timeout:?}",
                        self.search_text,
                        S::KIND.label()
                    );
                }
                Err(RecvTimeoutError::Disconnected) => {
                    bail!("search outcome channel closed");
                }
            }
        }
        Ok(self.poll_result(committed))
    }

    /// Sets the flag of a displayed row. The aggregate follows through the
    /// row's listener. Returns `false` when the row is not displayed.
    pub fn set_selected(&self, id: RecordId<S>, value: bool) -> bool {
        match self.displayed.iter().find(|row| row.id() == id) {
            Some(row) => {
                row.selection().set(value);
                true
            }
            None => {
                tracing::trace!(
                    screen = S::KIND.as_str(),
                    id = id.get(),
                    "selection ignored for row not displayed"
                );
                false
            }
        }
    }

    /// Selects or clears every displayed row; rows outside the view keep
    /// their flags.
    pub fn set_select_all(&mut self, value: bool) {
        if !self.is_loaded() {
            return;
        }
        for row in &self.displayed {
            row.selection().set(value);
        }
        self.recount();
    }

    /// Removes the given records from all three tiers. Unknown ids are
    /// ignored. Returns the ids actually removed, in Source order.
    pub fn remove(&mut self, ids: impl IntoIterator<Item = RecordId<S>>) -> Vec<RecordId<S>> {
        if !self.is_loaded() {
            return Vec::new();
        }
        let targets: HashSet<RecordId<S>> = ids.into_iter().collect();
        let removed: Vec<RecordId<S>> = self
            .source
            .iter()
            .map(|row| row.id())
            .filter(|id| targets.contains(id))
            .collect();
        if removed.is_empty() {
            return removed;
        }

        let was_searching = self.supersede_search();
        for id in &removed {
            if let Some(handle) = self.listeners.remove(id) {
                handle.release();
            }
        }

        self.source.retain(|row| !targets.contains(&row.id()));
        self.filtered.retain(|row| !targets.contains(&row.id()));
        if was_searching {
            self.displayed = self.apply_active_search();
        } else {
            self.displayed.retain(|row| !targets.contains(&row.id()));
        }
        self.sync_listeners();
        self.recount();

        tracing::debug!(
            screen = S::KIND.as_str(),
            removed = removed.len(),
            "rows removed"
        );
        self.bus.publish(DataEvent::Removed {
            screen: S::KIND,
            ids: removed.iter().map(|id| id.get()).collect(),
        });
        removed
    }

    pub fn remove_selected(&mut self) -> Vec<RecordId<S>> {
        let selected = self.selected_ids();
        self.remove(selected)
    }

    /// Inserts a committed record or replaces the one with the same id. A
    /// replaced record keeps its selection.
    pub fn upsert(&mut self, record: S::Record) -> Upsert {
        if !self.is_loaded() {
            return Upsert::Ignored;
        }
        self.supersede_search();

        let id = record.id();
        let outcome = match self.source.iter().position(|row| row.id() == id) {
            Some(index) => {
                let flag = self.source[index].selection().clone();
                self.source[index] = Rc::new(Row::with_flag(record, flag));
                Upsert::Replaced
            }
            None => {
                self.source.push(Rc::new(Row::new(record)));
                Upsert::Inserted
            }
        };
        self.rebuild_filtered();
        self.rebuild_displayed();

        self.bus.publish(DataEvent::Upserted {
            screen: S::KIND,
            id: id.get(),
        });
        outcome
    }

    /// Releases every listener and drops all rows. The controller can be
    /// loaded again afterwards.
    pub fn dispose(&mut self) {
        self.supersede_search();
        self.release_all_listeners();
        self.source.clear();
        self.filtered.clear();
        self.displayed.clear();
        self.category = CategoryFilter::All;
        self.sort = S::default_sort();
        self.search_text.clear();
        self.counter.reset(SelectionAggregate::default());
        if self.state == ControllerState::Loaded {
            tracing::debug!(screen = S::KIND.as_str(), "screen disposed");
        }
        self.state = ControllerState::Empty;
    }

    pub const fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ControllerState::Loaded
    }

    pub fn category(&self) -> CategoryFilter<S::Category> {
        self.category
    }

    pub fn sort(&self) -> SortSpec<S::SortKey> {
        self.sort
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    pub const fn search_stats(&self) -> SearchStats {
        self.stats
    }

    pub fn aggregate(&self) -> SelectionAggregate {
        self.counter.get()
    }

    pub fn displayed(&self) -> &[SharedRow<S>] {
        &self.displayed
    }

    pub fn get(&self, id: RecordId<S>) -> Option<&Row<S::Record>> {
        self.source
            .iter()
            .find(|row| row.id() == id)
            .map(|row| row.as_ref())
    }

    pub fn displayed_ids(&self) -> Vec<RecordId<S>> {
        ids_of(&self.displayed)
    }

    pub fn filtered_ids(&self) -> Vec<RecordId<S>> {
        ids_of(&self.filtered)
    }

    pub fn source_ids(&self) -> Vec<RecordId<S>> {
        ids_of(&self.source)
    }

    pub fn selected_ids(&self) -> Vec<RecordId<S>> {
        self.displayed
            .iter()
            .filter(|row| row.is_selected())
            .map(|row| row.id())
            .collect()
    }

    /// Number of live selection listeners held by this controller.
    pub fn subscription_count(&self) -> usize {
        self.listeners.len()
    }

    /// Bumps the generation so any in-flight search is stale. Returns
    /// whether one was in flight.
    fn supersede_search(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        let was_searching = std::mem::replace(&mut self.searching, false);
        if was_searching {
            tracing::debug!(
                screen = S::KIND.as_str(),
                generation = self.generation,
                "in-flight search superseded"
            );
        }
        was_searching
    }

    fn drain_outcomes(&mut self) -> Option<usize> {
        let mut committed = None;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if let Some(matched) = self.accept_outcome(outcome) {
                committed = Some(matched);
            }
        }
        committed
    }

    fn accept_outcome(&mut self, outcome: SearchOutcome<RecordId<S>>) -> Option<usize> {
        if !self.searching || outcome.generation != self.generation {
            self.stats.discarded += 1;
            tracing::debug!(
                screen = S::KIND.as_str(),
                generation = outcome.generation,
                current = self.generation,
                "stale search result discarded"
            );
            return None;
        }

        self.searching = false;
        self.stats.committed += 1;
        self.displayed = self.rows_matching(&outcome.matched);
        self.sync_listeners();
        self.recount();
        tracing::debug!(
            screen = S::KIND.as_str(),
            matched = self.displayed.len(),
            "search applied"
        );
        Some(self.displayed.len())
    }

    fn poll_result(&self, committed: Option<usize>) -> SearchPoll {
        match committed {
            Some(matched) => SearchPoll::Committed { matched },
            None if self.searching => SearchPoll::Pending,
            None => SearchPoll::Idle,
        }
    }

    fn rebuild_filtered(&mut self) {
        let category = self.category;
        self.filtered = self
            .source
            .iter()
            .filter(|row| S::admits(category, row.record()))
            .cloned()
            .collect();
        self.sort_filtered();
    }

    fn sort_filtered(&mut self) {
        let sort = self.sort;
        self.filtered
            .sort_by(|left, right| S::ordering(sort, left.record(), right.record()));
    }

    fn rebuild_displayed(&mut self) {
        self.displayed = self.apply_active_search();
        self.sync_listeners();
        self.recount();
    }

    fn apply_active_search(&self) -> Vec<SharedRow<S>> {
        if self.search_text.trim().is_empty() {
            return self.filtered.clone();
        }
        let matched = matching_ids(&self.candidates(), &self.search_text);
        self.rows_matching(&matched)
    }

    fn candidates(&self) -> Vec<SearchCandidate<RecordId<S>>> {
        self.filtered
            .iter()
            .map(|row| SearchCandidate::new(row.id(), S::search_fields(row.record())))
            .collect()
    }

    /// Rows of Filtered whose id is in `matched`, in Filtered order.
    fn rows_matching(&self, matched: &[RecordId<S>]) -> Vec<SharedRow<S>> {
        let matched: HashSet<RecordId<S>> = matched.iter().copied().collect();
        self.filtered
            .iter()
            .filter(|row| matched.contains(&row.id()))
            .cloned()
            .collect()
    }

    fn sync_listeners(&mut self) {
        let visible: HashSet<RecordId<S>> = self.displayed.iter().map(|row| row.id()).collect();
        self.listeners.retain(|id, handle| {
            if visible.contains(id) {
                return true;
            }
            handle.release();
            false
        });

        for row in &self.displayed {
            let id = row.id();
            if self.listeners.contains_key(&id) {
                continue;
            }
            let flag = row.selection().clone();
            let subscription = flag.subscribe(self.counter.listener());
            self.listeners
                .insert(id, ListenerHandle { flag, subscription });
        }
        tracing::trace!(
            screen = S::KIND.as_str(),
            listeners = self.listeners.len(),
            "selection listeners synced"
        );
    }

    fn release_all_listeners(&mut self) {
        for (_, handle) in self.listeners.drain() {
            handle.release();
        }
    }

    fn recount(&self) {
        let selected = self
            .displayed
            .iter()
            .filter(|row| row.is_selected())
            .count();
        self.counter
            .reset(SelectionAggregate::new(selected, self.displayed.len()));
    }
}

impl<S: Screen> Drop for CollectionController<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn ids_of<R: Record>(rows: &[Rc<Row<R>>]) -> Vec<R::Id> {
    rows.iter().map(|row| row.id()).collect()
}

#[cfg(test)]
mod tests {
    use super::{CollectionController, ControllerState, Upsert};
    use crate::bus::EventBus;
    use crate::screens::{CategoryFilter, EmployeeSortKey, EmployeesScreen};
    use crate::search::{
        InlineDispatcher, SearchDispatcher, SearchJob, SearchOutcome, SearchPoll, SearchStats,
    };
    use crate::selection::{SelectAllState, SelectionAggregate};
    use anyhow::{Result, bail};
    use gymdesk_app::{Employee, EmployeeId, EmploymentStatus, SortDirection};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc::Sender;
    use time::macros::date;

    type PendingJobs = Rc<RefCell<Vec<(SearchJob<EmployeeId>, Sender<SearchOutcome<EmployeeId>>)>>>;

    /// Holds jobs until the test resolves them, in whatever order it likes.
    #[derive(Default, Clone)]
    struct ManualDispatcher {
        pending: PendingJobs,
    }

    impl ManualDispatcher {
        fn resolve(&self, index: usize) {
            let (job, tx) = self.pending.borrow_mut().remove(index);
            let _ = tx.send(job.run());
        }
    }

    impl SearchDispatcher<EmployeeId> for ManualDispatcher {
        fn dispatch(
            &mut self,
            job: SearchJob<EmployeeId>,
            tx: Sender<SearchOutcome<EmployeeId>>,
        ) -> Result<()> {
            self.pending.borrow_mut().push((job, tx));
            Ok(())
        }
    }

    struct RefusingDispatcher;

    impl SearchDispatcher<EmployeeId> for RefusingDispatcher {
        fn dispatch(
            &mut self,
            _job: SearchJob<EmployeeId>,
            _tx: Sender<SearchOutcome<EmployeeId>>,
        ) -> Result<()> {
            bail!("worker pool is shut down")
        }
    }

    fn employee(id: i64, first: &str, last: &str, status: EmploymentStatus) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            position: "Trainer".to_owned(),
            email: format!("{}@gym.test", first.to_ascii_lowercase()),
            phone: String::new(),
            status,
            hire_date: date!(2025 - 01 - 15),
        }
    }

    fn staff() -> Vec<Employee> {
        vec![
            employee(1, "Jane", "Doe", EmploymentStatus::Active),
            employee(2, "Sam", "Reed", EmploymentStatus::Active),
            employee(3, "John", "Doe", EmploymentStatus::Inactive),
            employee(4, "Kai", "Brooks", EmploymentStatus::Terminated),
            employee(5, "Rowan", "Gray", EmploymentStatus::Active),
        ]
    }

    fn ids(values: &[i64]) -> Vec<EmployeeId> {
        values.iter().copied().map(EmployeeId::new).collect()
    }

    fn manual_controller() -> (CollectionController<EmployeesScreen>, ManualDispatcher) {
        let dispatcher = ManualDispatcher::default();
        let controller = CollectionController::new(EventBus::new(), dispatcher.clone());
        (controller, dispatcher)
    }

    #[test]
    fn operations_before_load_are_noops() {
        let mut controller =
            CollectionController::<EmployeesScreen>::new(EventBus::new(), InlineDispatcher);

        controller.set_category_filter(CategoryFilter::Only(EmploymentStatus::Active));
        controller.set_sort(EmployeeSortKey::Name, SortDirection::Desc);
        controller.search("doe");
        controller.set_select_all(true);
        assert!(!controller.set_selected(EmployeeId::new(1), true));
        assert!(controller.remove(ids(&[1])).is_empty());
        assert_eq!(
            controller.upsert(employee(9, "New", "Hire", EmploymentStatus::Active)),
            Upsert::Ignored
        );

        assert_eq!(controller.state(), ControllerState::Empty);
        assert!(controller.displayed().is_empty());
        assert_eq!(controller.aggregate(), SelectionAggregate::default());
        assert_eq!(controller.poll_search(), SearchPoll::Idle);
    }

    #[test]
    fn failed_dispatch_matches_inline_and_counts_as_committed() {
        let mut controller =
            CollectionController::<EmployeesScreen>::new(EventBus::new(), RefusingDispatcher);
        controller.load(staff());

        controller.search("doe");

        assert!(!controller.is_searching());
        assert_eq!(controller.displayed_ids(), ids(&[1, 3]));
        assert_eq!(
            controller.search_stats(),
            SearchStats {
                issued: 1,
                committed: 1,
                discarded: 0,
            }
        );
        assert_eq!(controller.poll_search(), SearchPoll::Idle);
    }

    #[test]
    fn reload_keeps_exactly_one_listener_per_displayed_row() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        controller.load(staff());

        assert_eq!(controller.subscription_count(), 5);
        for row in controller.displayed() {
            assert_eq!(row.selection().listener_count(), 1);
        }
    }

    #[test]
    fn flag_toggled_outside_the_controller_updates_aggregate() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());

        let handle = controller.displayed()[1].selection().clone();
        handle.set(true);
        assert_eq!(controller.aggregate(), SelectionAggregate::new(1, 5));

        handle.set(false);
        assert_eq!(controller.aggregate(), SelectionAggregate::new(0, 5));
    }

    #[test]
    fn set_selected_ignores_rows_outside_the_view() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        controller.set_category_filter(CategoryFilter::Only(EmploymentStatus::Active));

        assert!(!controller.set_selected(EmployeeId::new(3), true));
        assert!(controller.set_selected(EmployeeId::new(2), true));
        assert_eq!(controller.aggregate(), SelectionAggregate::new(1, 3));
        assert_eq!(
            controller
                .get(EmployeeId::new(3))
                .map(|row| row.is_selected()),
            Some(false)
        );
    }

    #[test]
    fn latest_search_wins_when_older_result_arrives_last() {
        let (mut controller, dispatcher) = manual_controller();
        controller.load(staff());

        controller.search("reed");
        controller.search("doe");
        assert!(controller.is_searching());

        dispatcher.resolve(1);
        assert_eq!(
            controller.poll_search(),
            SearchPoll::Committed { matched: 2 }
        );
        dispatcher.resolve(0);
        assert_eq!(controller.poll_search(), SearchPoll::Idle);

        assert_eq!(controller.displayed_ids(), ids(&[1, 3]));
        let stats = controller.search_stats();
        assert_eq!((stats.issued, stats.committed, stats.discarded), (2, 1, 1));
    }

    #[test]
    fn older_result_arriving_first_is_discarded_and_search_stays_pending() {
        let (mut controller, dispatcher) = manual_controller();
        controller.load(staff());

        controller.search("reed");
        controller.search("doe");
        dispatcher.resolve(0);
        assert_eq!(controller.poll_search(), SearchPoll::Pending);
        assert_eq!(controller.displayed().len(), 5);

        dispatcher.resolve(0);
        assert_eq!(
            controller.poll_search(),
            SearchPoll::Committed { matched: 2 }
        );
        assert!(!controller.is_searching());
    }

    #[test]
    fn category_change_supersedes_pending_search_but_keeps_its_text() {
        let (mut controller, dispatcher) = manual_controller();
        controller.load(staff());

        controller.search("doe");
        controller.set_category_filter(CategoryFilter::Only(EmploymentStatus::Active));
        assert!(!controller.is_searching());
        assert_eq!(controller.displayed_ids(), ids(&[1]));

        dispatcher.resolve(0);
        assert_eq!(controller.poll_search(), SearchPoll::Idle);
        assert_eq!(controller.displayed_ids(), ids(&[1]));
        assert_eq!(controller.search_text(), "doe");
    }

    #[test]
    fn blank_search_restores_filtered_order_immediately() {
        let (mut controller, dispatcher) = manual_controller();
        controller.load(staff());
        controller.set_sort(EmployeeSortKey::Name, SortDirection::Asc);

        controller.search("doe");
        dispatcher.resolve(0);
        controller.poll_search();
        assert_eq!(controller.displayed().len(), 2);

        controller.search("   ");
        assert!(!controller.is_searching());
        assert_eq!(controller.displayed_ids(), controller.filtered_ids());
        assert_eq!(controller.search_text(), "");
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let (mut controller, _) = manual_controller();
        let mut records = staff();
        records[0].hire_date = date!(2024 - 06 - 01);
        records[3].hire_date = date!(2024 - 06 - 01);
        controller.load(records);

        controller.set_sort(EmployeeSortKey::HireDate, SortDirection::Asc);
        assert_eq!(controller.displayed_ids(), ids(&[1, 4, 2, 3, 5]));

        controller.set_sort(EmployeeSortKey::HireDate, SortDirection::Desc);
        assert_eq!(controller.displayed_ids(), ids(&[2, 3, 5, 1, 4]));
    }

    #[test]
    fn removing_a_selected_row_drops_both_counts_by_one() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        controller.set_selected(EmployeeId::new(3), true);
        controller.set_selected(EmployeeId::new(5), true);
        assert_eq!(controller.aggregate(), SelectionAggregate::new(2, 5));

        let removed = controller.remove(ids(&[3]));
        assert_eq!(removed, ids(&[3]));
        assert_eq!(controller.aggregate(), SelectionAggregate::new(1, 4));
        assert_eq!(controller.source_ids(), ids(&[1, 2, 4, 5]));
        assert_eq!(controller.subscription_count(), 4);
    }

    #[test]
    fn removed_row_handle_no_longer_reaches_the_aggregate() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        let stale = controller.displayed()[0].selection().clone();

        controller.remove(ids(&[1]));
        assert_eq!(stale.listener_count(), 0);
        stale.set(true);
        assert_eq!(controller.aggregate(), SelectionAggregate::new(0, 4));
    }

    #[test]
    fn upsert_replaces_in_place_and_keeps_selection() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        controller.set_selected(EmployeeId::new(2), true);

        let mut edited = employee(2, "Samuel", "Reed", EmploymentStatus::Active);
        edited.position = "Manager".to_owned();
        assert_eq!(controller.upsert(edited), Upsert::Replaced);
        assert_eq!(
            controller
                .get(EmployeeId::new(2))
                .map(|row| (row.record().first_name.clone(), row.is_selected())),
            Some(("Samuel".to_owned(), true))
        );

        let inserted = controller.upsert(employee(6, "Drew", "Hill", EmploymentStatus::Active));
        assert_eq!(inserted, Upsert::Inserted);
        assert_eq!(controller.aggregate(), SelectionAggregate::new(1, 6));
        assert_eq!(controller.subscription_count(), 6);
    }

    #[test]
    fn select_all_reports_tri_state() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());

        controller.set_select_all(true);
        assert_eq!(controller.aggregate().state(), SelectAllState::All);
        controller.set_selected(EmployeeId::new(4), false);
        assert_eq!(controller.aggregate().state(), SelectAllState::Some);
        controller.set_select_all(false);
        assert_eq!(controller.aggregate().state(), SelectAllState::None);
    }

    #[test]
    fn dispose_releases_every_listener() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        let handles: Vec<_> = controller
            .displayed()
            .iter()
            .map(|row| row.selection().clone())
            .collect();

        controller.dispose();

        assert_eq!(controller.state(), ControllerState::Empty);
        assert_eq!(controller.subscription_count(), 0);
        assert!(handles.iter().all(|flag| flag.listener_count() == 0));
    }

    #[test]
    fn drop_releases_every_listener() {
        let (mut controller, _) = manual_controller();
        controller.load(staff());
        let handle = controller.displayed()[0].selection().clone();
        assert_eq!(handle.listener_count(), 1);

        drop(controller);
        assert_eq!(handle.listener_count(), 0);
    }
}
