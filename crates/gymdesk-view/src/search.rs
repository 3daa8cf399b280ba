// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

pub const DEFAULT_SEARCH_LATENCY: Duration = Duration::from_millis(300);

/// One row's searchable text, lowercased up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate<Id> {
    pub id: Id,
    pub haystack: Vec<String>,
}

impl<Id> SearchCandidate<Id> {
    pub fn new(id: Id, fields: Vec<String>) -> Self {
        Self {
            id,
            haystack: fields
                .into_iter()
                .map(|field| field.to_lowercase())
                .collect(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.haystack.iter().any(|field| field.contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchJob<Id> {
    pub generation: u64,
    pub query: String,
    pub candidates: Vec<SearchCandidate<Id>>,
}

impl<Id: Copy> SearchJob<Id> {
    /// Case-insensitive substring match against any field, in candidate order.
    pub fn run(&self) -> SearchOutcome<Id> {
        SearchOutcome {
            generation: self.generation,
            matched: matching_ids(&self.candidates, &self.query),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<Id> {
    pub generation: u64,
    pub matched: Vec<Id>,
}

pub fn matching_ids<Id: Copy>(candidates: &[SearchCandidate<Id>], query: &str) -> Vec<Id> {
    let needle = query.trim().to_lowercase();
    candidates
        .iter()
        .filter(|candidate| candidate.matches(&needle))
        .map(|candidate| candidate.id)
        .collect()
}

/// Resolves search jobs off the calling path. Outcomes travel back over
/// `tx`; the controller decides whether they are still current.
pub trait SearchDispatcher<Id> {
    fn dispatch(&mut self, job: SearchJob<Id>, tx: Sender<SearchOutcome<Id>>) -> Result<()>;
}

/// Runs each job on a worker thread after an artificial delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadDispatcher {
    latency: Duration,
}

impl ThreadDispatcher {
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for ThreadDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_LATENCY)
    }
}

impl<Id> SearchDispatcher<Id> for ThreadDispatcher
where
    Id: Copy + Send + 'static,
{
    fn dispatch(&mut self, job: SearchJob<Id>, tx: Sender<SearchOutcome<Id>>) -> Result<()> {
        let latency = self.latency;
        thread::Builder::new()
            .name("gymdesk-search".to_owned())
            .spawn(move || {
                if !latency.is_zero() {
                    thread::sleep(latency);
                }
                // The receiver is gone once the owning controller is dropped.
                let _ = tx.send(job.run());
            })
            .context("spawn search worker")?;
        Ok(())
    }
}

/// Answers on the calling thread; the outcome is still only applied when
/// the controller polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineDispatcher;

impl<Id: Copy> SearchDispatcher<Id> for InlineDispatcher {
    fn dispatch(&mut self, job: SearchJob<Id>, tx: Sender<SearchOutcome<Id>>) -> Result<()> {
        tx.send(job.run())
            .map_err(|_| anyhow::anyhow!("search outcome channel closed"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPoll {
    Idle,
    Pending,
    Committed { matched: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SearchStats {
    pub issued: u64,
    pub committed: u64,
    pub discarded: u64,
}
