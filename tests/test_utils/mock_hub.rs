//! Routine hub double

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use menuterm::hub::{RoutineUpload, UploadStatus};
use menuterm::{Result, RoutineHub};

/// Answers uploads from a script and keeps every request
#[derive(Clone, Default)]
pub struct MockHub {
    responses: Rc<RefCell<VecDeque<UploadStatus>>>,
    requests: Rc<RefCell<Vec<RoutineUpload>>>,
}

impl MockHub {
    pub fn new(responses: impl IntoIterator<Item = UploadStatus>) -> Self {
        Self {
            responses: Rc::new(RefCell::new(responses.into_iter().collect())),
            requests: Rc::default(),
        }
    }

    pub fn requests(&self) -> Vec<RoutineUpload> {
        self.requests.borrow().clone()
    }
}

impl RoutineHub for MockHub {
    fn upload(&self, routine: &RoutineUpload) -> Result<UploadStatus> {
        self.requests.borrow_mut().push(routine.clone());
        Ok(self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(UploadStatus::Created { url: None }))
    }
}
