//! Session registry: handle → live backend object plus parent link.
//!
//! One registry lives for the lifetime of a server. It is an ordinary value,
//! injected where needed (usually as `Arc<Registry<P>>`), so tests build a
//! fresh one each time.
//!
//! # Concurrency Model
//!
//! - DashMap for sharded concurrent access to entries
//! - Handles come from an atomic [`HandleAllocator`], never reused
//! - An entry is inserted only once its backend object exists, so lookups
//!   never observe a half-built entry
//! - Each presentation object sits behind its own `parking_lot::Mutex`;
//!   callers hold it for the whole of any operation on that presentation
//! - A failed composite build drops its own subtree again; removed handles
//!   are never reissued

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use deckhand_types::{Handle, HandleAllocator, HandleKind, RegistryId};

use crate::backend::{ShapeKey, SlideKey};
use crate::error::{DeckError, Result};

/// A presentation object behind its per-presentation lock.
pub type SharedPresentation<P> = Arc<Mutex<P>>;

/// Where a slide lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideRef {
    pub presentation: Handle,
    pub key: SlideKey,
}

/// Where a shape lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeRef {
    pub presentation: Handle,
    pub slide: Handle,
    pub slide_key: SlideKey,
    pub key: ShapeKey,
}

/// The backend object a handle stands for.
pub enum Object<P> {
    Presentation(SharedPresentation<P>),
    Slide(SlideRef),
    Shape(ShapeRef),
}

impl<P> Object<P> {
    pub fn kind(&self) -> HandleKind {
        match self {
            Object::Presentation(_) => HandleKind::Presentation,
            Object::Slide(_) => HandleKind::Slide,
            Object::Shape(_) => HandleKind::Shape,
        }
    }
}

impl<P> Clone for Object<P> {
    fn clone(&self) -> Self {
        match self {
            Object::Presentation(p) => Object::Presentation(Arc::clone(p)),
            Object::Slide(s) => Object::Slide(*s),
            Object::Shape(s) => Object::Shape(*s),
        }
    }
}

impl<P> std::fmt::Debug for Object<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Presentation(_) => write!(f, "Presentation"),
            Object::Slide(s) => write!(f, "Slide({:?})", s.key),
            Object::Shape(s) => write!(f, "Shape({:?})", s.key),
        }
    }
}

/// Entry for one handle.
struct Entry<P> {
    parent: Option<Handle>,
    object: Object<P>,
    /// Display label, e.g. the file name a presentation was created with.
    label: Option<String>,
    /// Child handles in registration order.
    children: RwLock<Vec<Handle>>,
}

/// Handle → object store with parent/child links.
pub struct Registry<P> {
    entries: DashMap<Handle, Entry<P>>,
    alloc: HandleAllocator,
}

impl<P> Registry<P> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            alloc: HandleAllocator::new(RegistryId::new()),
        }
    }

    pub fn id(&self) -> RegistryId {
        self.alloc.registry()
    }

    /// Store `object` under a fresh handle.
    ///
    /// Presentations take no parent; slides need a presentation parent and
    /// shapes a slide parent. Anything else fails with `InvalidParent` and
    /// allocates nothing.
    pub fn register(
        &self,
        kind: HandleKind,
        parent: Option<Handle>,
        object: Object<P>,
    ) -> Result<Handle> {
        self.register_labeled(kind, parent, object, None)
    }

    /// [`register`](Self::register) with a display label.
    pub fn register_labeled(
        &self,
        kind: HandleKind,
        parent: Option<Handle>,
        object: Object<P>,
        label: Option<String>,
    ) -> Result<Handle> {
        if object.kind() != kind {
            return Err(DeckError::invalid_argument(format!(
                "cannot register a {} object as a {kind}",
                object.kind()
            )));
        }
        self.check_parent(kind, parent.as_ref())?;

        let handle = self.alloc.allocate(kind);
        self.entries.insert(
            handle,
            Entry {
                parent,
                object,
                label,
                children: RwLock::new(Vec::new()),
            },
        );
        // Link after insert: a listed child always resolves.
        if let Some(p) = parent {
            if let Some(entry) = self.entries.get(&p) {
                entry.children.write().push(handle);
            }
        }

        debug!(%handle, ?parent, "registered");
        Ok(handle)
    }

    /// Drop `handle` and everything registered under it, unlinking it from
    /// its parent. Returns the number of entries removed; an unknown handle
    /// removes nothing.
    ///
    /// Only for undoing a build whose handles never reached a caller; the
    /// tool surface has no delete.
    pub(crate) fn remove_tree(&self, handle: &Handle) -> usize {
        let Some((_, entry)) = self.entries.remove(handle) else {
            return 0;
        };
        if let Some(p) = entry.parent {
            if let Some(parent) = self.entries.get(&p) {
                parent.children.write().retain(|c| c != handle);
            }
        }

        let mut removed = 1;
        let mut pending = entry.children.into_inner();
        while let Some(child) = pending.pop() {
            if let Some((_, e)) = self.entries.remove(&child) {
                removed += 1;
                pending.extend(e.children.into_inner());
            }
        }
        debug!(%handle, removed, "removed subtree");
        removed
    }

    fn check_parent(&self, kind: HandleKind, parent: Option<&Handle>) -> Result<()> {
        match (kind.parent_kind(), parent) {
            (None, None) => Ok(()),
            (None, Some(p)) => Err(DeckError::InvalidParent(format!(
                "a {kind} takes no parent, got {p}"
            ))),
            (Some(expected), None) => Err(DeckError::InvalidParent(format!(
                "a {kind} needs a {expected} parent"
            ))),
            (Some(expected), Some(p)) => {
                let actual = self
                    .entries
                    .get(p)
                    .map(|e| e.object.kind())
                    .ok_or_else(|| DeckError::InvalidParent(format!("{p} does not exist")))?;
                if actual == expected {
                    Ok(())
                } else {
                    Err(DeckError::InvalidParent(format!(
                        "{p} is a {actual}, a {kind} needs a {expected} parent"
                    )))
                }
            }
        }
    }

    /// Look up the object stored under `handle`.
    pub fn resolve(&self, handle: &Handle, expected: HandleKind) -> Result<Object<P>> {
        let entry = self
            .entries
            .get(handle)
            .ok_or_else(|| DeckError::not_found(handle.to_string()))?;
        let actual = entry.object.kind();
        if actual != expected {
            return Err(DeckError::KindMismatch {
                handle: handle.to_string(),
                expected,
                actual,
            });
        }
        Ok(entry.object.clone())
    }

    pub fn resolve_presentation(&self, handle: &Handle) -> Result<SharedPresentation<P>> {
        match self.resolve(handle, HandleKind::Presentation)? {
            Object::Presentation(p) => Ok(p),
            other => Err(mismatch(handle, HandleKind::Presentation, other.kind())),
        }
    }

    pub fn resolve_slide(&self, handle: &Handle) -> Result<SlideRef> {
        match self.resolve(handle, HandleKind::Slide)? {
            Object::Slide(s) => Ok(s),
            other => Err(mismatch(handle, HandleKind::Slide, other.kind())),
        }
    }

    pub fn resolve_shape(&self, handle: &Handle) -> Result<ShapeRef> {
        match self.resolve(handle, HandleKind::Shape)? {
            Object::Shape(s) => Ok(s),
            other => Err(mismatch(handle, HandleKind::Shape, other.kind())),
        }
    }

    /// Parse a wire handle. Unparseable strings were never issued, so they
    /// fail as `NotFound`.
    pub fn parse_handle(&self, key: &str) -> Result<Handle> {
        Handle::from_key(key).ok_or_else(|| DeckError::not_found(key.to_string()))
    }

    /// Child handles in registration order.
    pub fn children(&self, handle: &Handle) -> Result<Vec<Handle>> {
        self.entries
            .get(handle)
            .map(|e| e.children.read().clone())
            .ok_or_else(|| DeckError::not_found(handle.to_string()))
    }

    pub fn parent(&self, handle: &Handle) -> Result<Option<Handle>> {
        self.entries
            .get(handle)
            .map(|e| e.parent)
            .ok_or_else(|| DeckError::not_found(handle.to_string()))
    }

    pub fn label(&self, handle: &Handle) -> Result<Option<String>> {
        self.entries
            .get(handle)
            .map(|e| e.label.clone())
            .ok_or_else(|| DeckError::not_found(handle.to_string()))
    }

    /// The presentation at the root of `handle`'s ownership chain.
    pub fn presentation_of(&self, handle: &Handle) -> Result<Handle> {
        let entry = self
            .entries
            .get(handle)
            .ok_or_else(|| DeckError::not_found(handle.to_string()))?;
        Ok(match &entry.object {
            Object::Presentation(_) => *handle,
            Object::Slide(s) => s.presentation,
            Object::Shape(s) => s.presentation,
        })
    }

    /// All handles of one kind, oldest first.
    pub fn handles(&self, kind: HandleKind) -> Vec<Handle> {
        let mut out: Vec<Handle> = self
            .entries
            .iter()
            .filter(|e| e.value().object.kind() == kind)
            .map(|e| *e.key())
            .collect();
        out.sort_by_key(|h| h.seq());
        out
    }

    pub fn contains(&self, handle: &Handle) -> bool {
        self.entries.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(handle: &Handle, expected: HandleKind, actual: HandleKind) -> DeckError {
    DeckError::KindMismatch {
        handle: handle.to_string(),
        expected,
        actual,
    }
}

/// Shared registry handle.
pub type SharedRegistry<P> = Arc<Registry<P>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    type Reg = Registry<Vec<&'static str>>;

    fn pres(reg: &Reg) -> Handle {
        reg.register(
            HandleKind::Presentation,
            None,
            Object::Presentation(Arc::new(Mutex::new(Vec::new()))),
        )
        .unwrap()
    }

    fn slide(reg: &Reg, p: Handle, key: u32) -> Result<Handle> {
        reg.register(
            HandleKind::Slide,
            Some(p),
            Object::Slide(SlideRef {
                presentation: p,
                key: SlideKey(key),
            }),
        )
    }

    fn shape(reg: &Reg, p: Handle, s: Handle, key: u32) -> Result<Handle> {
        reg.register(
            HandleKind::Shape,
            Some(s),
            Object::Shape(ShapeRef {
                presentation: p,
                slide: s,
                slide_key: SlideKey(0),
                key: ShapeKey(key),
            }),
        )
    }

    #[test]
    fn test_register_and_resolve() {
        let reg = Reg::new();
        let obj = Arc::new(Mutex::new(vec!["deck"]));
        let p = reg
            .register(
                HandleKind::Presentation,
                None,
                Object::Presentation(Arc::clone(&obj)),
            )
            .unwrap();

        let resolved = reg.resolve_presentation(&p).unwrap();
        assert!(Arc::ptr_eq(&resolved, &obj));

        let s = slide(&reg, p, 256).unwrap();
        let sref = reg.resolve_slide(&s).unwrap();
        assert_eq!(sref.presentation, p);
        assert_eq!(sref.key, SlideKey(256));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_never_issued_is_not_found() {
        let reg = Reg::new();
        let other = Reg::new();
        let foreign = pres(&other);

        assert!(matches!(
            reg.resolve(&foreign, HandleKind::Presentation),
            Err(DeckError::NotFound(_))
        ));
        assert!(matches!(
            reg.parse_handle("not-a-handle"),
            Err(DeckError::NotFound(_))
        ));
        assert!(matches!(reg.children(&foreign), Err(DeckError::NotFound(_))));
    }

    #[test]
    fn test_kind_mismatch() {
        let reg = Reg::new();
        let p = pres(&reg);
        let s = slide(&reg, p, 256).unwrap();

        let err = reg.resolve(&p, HandleKind::Slide).unwrap_err();
        assert!(matches!(
            err,
            DeckError::KindMismatch {
                expected: HandleKind::Slide,
                actual: HandleKind::Presentation,
                ..
            }
        ));
        assert!(matches!(
            reg.resolve_presentation(&s),
            Err(DeckError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_parent_registers_nothing() {
        let reg = Reg::new();
        let other = Reg::new();
        let foreign = pres(&other);

        assert!(matches!(
            slide(&reg, foreign, 256),
            Err(DeckError::InvalidParent(_))
        ));
        assert!(reg.is_empty());

        let p = pres(&reg);
        // A shape under a presentation skips the slide level.
        assert!(matches!(
            shape(&reg, p, p, 3),
            Err(DeckError::InvalidParent(_))
        ));
        // Slides must have a parent at all.
        let orphan = reg.register(
            HandleKind::Slide,
            None,
            Object::Slide(SlideRef {
                presentation: p,
                key: SlideKey(256),
            }),
        );
        assert!(matches!(orphan, Err(DeckError::InvalidParent(_))));
        // Presentations take none.
        let nested = reg.register(
            HandleKind::Presentation,
            Some(p),
            Object::Presentation(Arc::new(Mutex::new(Vec::new()))),
        );
        assert!(matches!(nested, Err(DeckError::InvalidParent(_))));

        assert_eq!(reg.len(), 1);
        assert!(reg.children(&p).unwrap().is_empty());
    }

    #[test]
    fn test_children_in_insertion_order() {
        let reg = Reg::new();
        let p = pres(&reg);
        let slides: Vec<Handle> = (0..5).map(|i| slide(&reg, p, 256 + i).unwrap()).collect();
        assert_eq!(reg.children(&p).unwrap(), slides);

        let s = slides[2];
        let a = shape(&reg, p, s, 3).unwrap();
        let b = shape(&reg, p, s, 4).unwrap();
        assert_eq!(reg.children(&s).unwrap(), vec![a, b]);
        assert!(reg.children(&slides[0]).unwrap().is_empty());

        assert_eq!(reg.parent(&a).unwrap(), Some(s));
        assert_eq!(reg.presentation_of(&a).unwrap(), p);
        assert_eq!(reg.presentation_of(&p).unwrap(), p);
    }

    #[test]
    fn test_handles_unique_across_kinds() {
        let reg = Reg::new();
        let mut seen = HashSet::new();
        for _ in 0..3 {
            let p = pres(&reg);
            assert!(seen.insert(p.to_key()));
            for k in 0..3 {
                let s = slide(&reg, p, 256 + k).unwrap();
                assert!(seen.insert(s.to_key()));
                for j in 0..3 {
                    let sh = shape(&reg, p, s, 3 + j).unwrap();
                    assert!(seen.insert(sh.to_key()));
                }
            }
        }
        assert_eq!(seen.len(), reg.len());
        assert_eq!(reg.handles(HandleKind::Presentation).len(), 3);
        assert_eq!(reg.handles(HandleKind::Shape).len(), 27);
    }

    #[test]
    fn test_labels() {
        let reg = Reg::new();
        let p = reg
            .register_labeled(
                HandleKind::Presentation,
                None,
                Object::Presentation(Arc::new(Mutex::new(Vec::new()))),
                Some("quarterly".into()),
            )
            .unwrap();
        assert_eq!(reg.label(&p).unwrap().as_deref(), Some("quarterly"));
    }

    #[test]
    fn test_object_kind_must_match() {
        let reg = Reg::new();
        let err = reg
            .register(
                HandleKind::Slide,
                None,
                Object::Presentation(Arc::new(Mutex::new(Vec::new()))),
            )
            .unwrap_err();
        assert!(matches!(err, DeckError::InvalidArgument(_)));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_tree() {
        let reg = Reg::new();
        let p = pres(&reg);
        let keep = pres(&reg);
        let s1 = slide(&reg, p, 256).unwrap();
        let s2 = slide(&reg, p, 257).unwrap();
        let a = shape(&reg, p, s1, 3).unwrap();
        let b = shape(&reg, p, s2, 4).unwrap();
        let kept_slide = slide(&reg, keep, 256).unwrap();

        // A single slide unlinks from its presentation.
        assert_eq!(reg.remove_tree(&s2), 2);
        assert!(!reg.contains(&b));
        assert_eq!(reg.children(&p).unwrap(), vec![s1]);

        assert_eq!(reg.remove_tree(&p), 3);
        for h in [p, s1, a] {
            assert!(matches!(
                reg.resolve(&h, h.kind()),
                Err(DeckError::NotFound(_))
            ));
        }
        assert_eq!(reg.remove_tree(&p), 0);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.children(&keep).unwrap(), vec![kept_slide]);

        // Removed handles are never handed out again.
        let fresh = pres(&reg);
        assert!(fresh.seq() > b.seq());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration() {
        let reg: Arc<Reg> = Arc::new(Reg::new());
        let p = pres(&reg);

        let mut set = tokio::task::JoinSet::new();
        for t in 0..8u32 {
            let reg = Arc::clone(&reg);
            set.spawn(async move {
                let mut mine = Vec::new();
                for i in 0..50u32 {
                    mine.push(slide(&reg, p, t * 100 + i).unwrap());
                }
                mine
            });
        }

        let mut all = HashSet::new();
        while let Some(res) = set.join_next().await {
            for h in res.unwrap() {
                assert!(all.insert(h), "duplicate handle {h}");
                assert!(reg.resolve_slide(&h).is_ok());
            }
        }
        assert_eq!(all.len(), 400);
        assert_eq!(reg.children(&p).unwrap().len(), 400);
    }
}
