// Copyright 2025 the Handoff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Next-turn task queue.
//!
//! Models "run this after the current event handler returns" (a zero-delay
//! timer in a browser). A turn runs only the tasks that were queued before it
//! started; tasks queued by those tasks wait for the following turn.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::cell::RefCell;

type Task = Box<dyn FnOnce()>;

/// FIFO of deferred tasks.
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl core::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl TaskQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next turn.
    pub fn push(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run one turn. Returns the number of tasks run.
    pub fn run_turn(&self) -> usize {
        let batch = core::mem::take(&mut *self.tasks.borrow_mut());
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Run turns until the queue stays empty. Returns the number of tasks run.
    ///
    /// A task that always re-queues itself makes this loop forever.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_turn();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}
