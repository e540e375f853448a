//! Where a snapshot wrapper lives while it is being rasterized.
//!
//! Attaching returns a [`StagedWrapper`] guard; dropping the guard detaches
//! the wrapper, so removal happens on every path out of the export.

use std::cell::RefCell;

use tracing::debug;

use crate::core::error::ExportError;
use crate::export::snapshot::SnapshotWrapper;

pub trait Stage {
    fn attach(&self, wrapper: &SnapshotWrapper) -> Result<(), ExportError>;
    fn detach(&self, id: &str);
}

/// Detaches its wrapper when dropped.
pub struct StagedWrapper<'a> {
    stage: &'a dyn Stage,
    id: String,
}

impl<'a> StagedWrapper<'a> {
    pub fn attach(stage: &'a dyn Stage, wrapper: &SnapshotWrapper) -> Result<Self, ExportError> {
        stage.attach(wrapper)?;
        debug!(id = %wrapper.id, "wrapper attached");
        Ok(Self {
            stage,
            id: wrapper.id.clone(),
        })
    }
}

impl Drop for StagedWrapper<'_> {
    fn drop(&mut self) {
        self.stage.detach(&self.id);
        debug!(id = %self.id, "wrapper detached");
    }
}

/// In-memory stage used natively and in tests.
#[derive(Default)]
pub struct MemoryStage {
    attached: RefCell<Vec<String>>,
}

impl MemoryStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached_ids(&self) -> Vec<String> {
        self.attached.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.borrow().is_empty()
    }
}

impl Stage for MemoryStage {
    fn attach(&self, wrapper: &SnapshotWrapper) -> Result<(), ExportError> {
        self.attached.borrow_mut().push(wrapper.id.clone());
        Ok(())
    }

    fn detach(&self, id: &str) {
        self.attached.borrow_mut().retain(|attached| attached != id);
    }
}

/// Parks the wrapper SVG in an off-screen container on the live page.
#[cfg(target_arch = "wasm32")]
pub struct DomStage;

#[cfg(target_arch = "wasm32")]
impl Stage for DomStage {
    fn attach(&self, wrapper: &SnapshotWrapper) -> Result<(), ExportError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ExportError::Page("document unavailable".into()))?;
        let body = document
            .body()
            .ok_or_else(|| ExportError::Page("missing body".into()))?;
        let holder = document
            .create_element("div")
            .map_err(|_| ExportError::Page("unable to create wrapper".into()))?;
        holder.set_id(&format!("snapshot-{}", wrapper.id));
        holder
            .set_attribute(
                "style",
                &format!(
                    "position: fixed; left: -9999px; top: 0; width: {}px; background: #ffffff;",
                    wrapper.width
                ),
            )
            .ok();
        holder.set_inner_html(&wrapper.svg);
        body.append_child(&holder)
            .map_err(|_| ExportError::Page("unable to attach wrapper".into()))?;
        Ok(())
    }

    fn detach(&self, id: &str) {
        if let Some(holder) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&format!("snapshot-{id}")))
        {
            holder.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(id: &str) -> SnapshotWrapper {
        SnapshotWrapper {
            id: id.into(),
            width: 100.0,
            height: 50.0,
            svg: "<svg/>".into(),
            skipped_assets: vec![],
        }
    }

    #[test]
    fn guard_detaches_on_drop() {
        let stage = MemoryStage::new();
        {
            let _guard = StagedWrapper::attach(&stage, &wrapper("a")).unwrap();
            assert_eq!(stage.attached_ids(), vec!["a".to_string()]);
        }
        assert!(stage.is_empty());
    }

    #[test]
    fn guard_detaches_when_the_body_fails() {
        let stage = MemoryStage::new();
        let outcome: Result<(), ExportError> = (|| {
            let _guard = StagedWrapper::attach(&stage, &wrapper("b"))?;
            Err(ExportError::Rasterization("boom".into()))
        })();
        assert!(outcome.is_err());
        assert!(stage.is_empty());
    }
}
