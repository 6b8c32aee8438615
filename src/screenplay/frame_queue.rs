//! Work deferred to the next paint.

use line_store::LineId;

/// A callback scheduled for the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameTask {
    /// Give the line native focus and put the caret after its last char.
    FocusLineAtEnd { id: LineId },
}

/// Tasks run once, in scheduling order, at the start of the next frame.
#[derive(Debug, Default)]
pub struct FrameQueue {
    tasks: Vec<FrameTask>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: FrameTask) {
        self.tasks.push(task);
    }

    /// Removes and returns everything scheduled so far.
    pub fn take(&mut self) -> Vec<FrameTask> {
        std::mem::take(&mut self.tasks)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameQueue, FrameTask};
    use line_store::LineId;

    #[test]
    fn take_drains_in_order() {
        let mut queue = FrameQueue::new();
        queue.schedule(FrameTask::FocusLineAtEnd {
            id: LineId::from_raw("a"),
        });
        queue.schedule(FrameTask::FocusLineAtEnd {
            id: LineId::from_raw("b"),
        });
        assert_eq!(queue.len(), 2);

        let tasks = queue.take();
        assert_eq!(
            tasks,
            vec![
                FrameTask::FocusLineAtEnd {
                    id: LineId::from_raw("a")
                },
                FrameTask::FocusLineAtEnd {
                    id: LineId::from_raw("b")
                },
            ]
        );
        assert!(queue.is_empty());
    }
}
