use crate::{
    BeanMetadata, BeanMetadataCache, BeanProperty, BeanType, DefaultInstantiator, Error,
    Instantiator, Result, Value,
};
use std::{
    any::Any,
    fmt::{self, Debug, Display},
    sync::Arc,
};

/// Written in place of the segments that could not be resolved.
pub const UNRESOLVED_SEGMENT: &str = "<?>";

#[derive(Clone)]
pub struct PathNode {
    property: BeanProperty,
    owner: Arc<BeanMetadata>,
}

impl PathNode {
    pub fn property(&self) -> &BeanProperty {
        &self.property
    }
    /// Metadata of the bean declaring the property.
    pub fn owner(&self) -> &Arc<BeanMetadata> {
        &self.owner
    }
}

/// Dotted property path resolved against a root bean type.
///
/// Resolution stops at the first segment that is not a property of the bean
/// reached so far; that segment and the following ones are kept unresolved.
/// Building a path never fails.
#[derive(Clone)]
pub struct PropertyPath {
    root: BeanType,
    nodes: Vec<PathNode>,
    unresolved: Vec<String>,
    // Type of the last resolved property when a bean followed by unresolved segments.
    tail: Option<Arc<BeanMetadata>>,
}

impl PropertyPath {
    pub fn new(cache: &BeanMetadataCache, root: BeanType, path: &str) -> Self {
        Self::resolve(cache, root, path, false)
    }
    /// Like [`PropertyPath::new`] falling back to case insensitive property names.
    pub fn new_ignore_case(cache: &BeanMetadataCache, root: BeanType, path: &str) -> Self {
        Self::resolve(cache, root, path, true)
    }
    fn resolve(cache: &BeanMetadataCache, root: BeanType, path: &str, ignore_case: bool) -> Self {
        let segments = path.split('.').collect::<Vec<_>>();
        let mut nodes = Vec::with_capacity(segments.len());
        let mut owner = Some(cache.for_type(root));
        let mut resolved = 0;
        for (i, segment) in segments.iter().enumerate() {
            let Some(metadata) = owner.take() else {
                break;
            };
            let property = if ignore_case {
                metadata.property_ignore_case(segment)
            } else {
                metadata.property(segment)
            };
            let Some(property) = property.cloned() else {
                owner = Some(metadata);
                break;
            };
            if i + 1 < segments.len() {
                owner = property.bean_type().map(|bean| cache.for_type(bean));
            }
            nodes.push(PathNode {
                property,
                owner: metadata,
            });
            resolved += 1;
        }
        let unresolved = segments[resolved..]
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>();
        let tail = if unresolved.is_empty() { None } else { owner };
        Self {
            root,
            nodes,
            unresolved,
            tail,
        }
    }
    pub fn root(&self) -> BeanType {
        self.root
    }
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }
    pub fn resolved_len(&self) -> usize {
        self.nodes.len()
    }
    /// Every segment resolved to a property.
    pub fn is_resolved(&self) -> bool {
        !self.nodes.is_empty() && self.unresolved.is_empty()
    }
    pub fn unresolved_segments(&self) -> &[String] {
        &self.unresolved
    }
    /// The deepest resolved property.
    pub fn terminal_property(&self) -> Option<&BeanProperty> {
        self.nodes.last().map(|v| &v.property)
    }
    /// Walk from `root` to the bean owning the last segment, creating every
    /// missing intermediate bean with the default construction strategy.
    pub fn nested_object_mut<'a>(&self, root: &'a mut dyn Any) -> Result<&'a mut dyn Any> {
        self.nested_object_mut_with(root, &DefaultInstantiator)
    }
    /// Like [`PropertyPath::nested_object_mut`] creating intermediate beans with `instantiator`.
    ///
    /// On a partially resolved path it returns the deepest bean reached.
    pub fn nested_object_mut_with<'a>(
        &self,
        root: &'a mut dyn Any,
        instantiator: &dyn Instantiator,
    ) -> Result<&'a mut dyn Any> {
        let descend = if self.unresolved.is_empty() {
            self.nodes.len().saturating_sub(1)
        } else {
            self.nodes.len()
        };
        let mut current = root;
        for i in 0..descend {
            let property = &self.nodes[i].property;
            let Some(metadata) = self
                .nodes
                .get(i + 1)
                .map(|v| &v.owner)
                .or(self.tail.as_ref())
            else {
                break;
            };
            if property.nested(&*current)?.is_none() {
                log::trace!(
                    "Creating {} for `{}` of path `{}`",
                    metadata.bean_type().name(),
                    property.name(),
                    self
                );
                let instance = instantiator.new_instance(metadata)?;
                property.attach(current, instance)?;
            }
            current = property.nested_mut(current)?.ok_or_else(|| {
                Error::msg(format!(
                    "Property `{}` is still empty after creating its value",
                    property.name()
                ))
            })?;
        }
        Ok(current)
    }
    /// Assign `value` to the terminal property, creating the intermediate beans.
    ///
    /// Returns `false` without assigning anything when the path is not fully
    /// resolved (the resolved prefix is still created). This holds even when the
    /// last resolved property is a scalar: `name` in `name.length` is left untouched.
    pub fn set(&self, root: &mut dyn Any, value: Value) -> Result<bool> {
        self.set_with(root, value, &DefaultInstantiator)
    }
    pub fn set_with(
        &self,
        root: &mut dyn Any,
        value: Value,
        instantiator: &dyn Instantiator,
    ) -> Result<bool> {
        let Some(terminal) = self.nodes.last() else {
            return Ok(false);
        };
        let owner = self.nested_object_mut_with(root, instantiator)?;
        if !self.unresolved.is_empty() {
            return Ok(false);
        }
        terminal.property.set_value(owner, value)?;
        Ok(true)
    }
    /// Read the terminal property without creating anything, `None` when the
    /// path is not fully resolved or an intermediate bean is absent.
    pub fn get(&self, root: &dyn Any) -> Result<Option<Value>> {
        if !self.is_resolved() {
            return Ok(None);
        }
        let Some((terminal, prefix)) = self.nodes.split_last() else {
            return Ok(None);
        };
        let mut current = root;
        for node in prefix {
            match node.property.nested(current)? {
                Some(nested) => current = nested,
                None => return Ok(None),
            }
        }
        terminal.property.get_value(current).map(Some)
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(node.property.name())?;
        }
        if !self.unresolved.is_empty() {
            if !self.nodes.is_empty() {
                f.write_str(".")?;
            }
            f.write_str(UNRESOLVED_SEGMENT)?;
        }
        Ok(())
    }
}

impl Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyPath")
            .field("root", &self.root)
            .field("path", &self.to_string())
            .field("unresolved", &self.unresolved)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bean, Introspector};

    #[derive(Default, Debug)]
    struct Leaf {
        value: i32,
    }

    impl Bean for Leaf {
        fn instantiate() -> Self {
            Self::default()
        }
        fn introspect(i: &mut Introspector<Self>) {
            i.field("value", |v| &v.value, |v| &mut v.value);
        }
    }

    #[derive(Default, Debug)]
    struct Branch {
        label: String,
        leaf: Option<Box<Leaf>>,
    }

    impl Bean for Branch {
        fn instantiate() -> Self {
            Self::default()
        }
        fn introspect(i: &mut Introspector<Self>) {
            i.field("label", |v| &v.label, |v| &mut v.label).nested(
                "leaf",
                |v| v.leaf.as_deref(),
                |v| v.leaf.as_deref_mut(),
                |v, n| v.leaf = Some(Box::new(n)),
            );
        }
    }

    #[derive(Default, Debug)]
    struct Tree {
        name: String,
        branch: Option<Branch>,
    }

    impl Bean for Tree {
        fn instantiate() -> Self {
            Self::default()
        }
        fn introspect(i: &mut Introspector<Self>) {
            i.field("name", |v| &v.name, |v| &mut v.name).nested(
                "branch",
                |v| v.branch.as_ref(),
                |v| v.branch.as_mut(),
                |v, n| v.branch = Some(n),
            );
        }
    }

    #[test]
    fn vivifies_intermediate_beans() {
        let cache = BeanMetadataCache::new();
        let path = PropertyPath::new(&cache, BeanType::of::<Tree>(), "branch.leaf.value");
        assert!(path.is_resolved());
        assert_eq!(path.resolved_len(), 3);
        assert_eq!(path.to_string(), "branch.leaf.value");
        let mut tree = Tree::default();
        assert_eq!(path.get(&tree).unwrap(), None);
        assert!(path.set(&mut tree, Value::Int32(Some(42))).unwrap());
        assert_eq!(tree.branch.as_ref().unwrap().leaf.as_ref().unwrap().value, 42);
        assert_eq!(path.get(&tree).unwrap(), Some(Value::Int32(Some(42))));

        let label = PropertyPath::new(&cache, BeanType::of::<Tree>(), "branch.label");
        assert!(label.set(&mut tree, Value::Varchar(Some("oak".into()))).unwrap());
        let branch = tree.branch.as_ref().unwrap();
        assert_eq!(branch.label, "oak");
        assert_eq!(branch.leaf.as_ref().unwrap().value, 42);
    }

    #[test]
    fn unresolved_segments() {
        let cache = BeanMetadataCache::new();
        let path = PropertyPath::new(&cache, BeanType::of::<Tree>(), "branch.bogus.value");
        assert_eq!(path.resolved_len(), 1);
        assert!(!path.is_resolved());
        assert_eq!(path.unresolved_segments(), ["bogus", "value"]);
        assert_eq!(path.to_string(), "branch.<?>");
        assert_eq!(path.to_string(), "branch.<?>");

        let mut tree = Tree::default();
        assert!(!path.set(&mut tree, Value::Int32(Some(1))).unwrap());
        assert!(tree.branch.is_some());

        let none = PropertyPath::new(&cache, BeanType::of::<Tree>(), "missing.value");
        assert_eq!(none.resolved_len(), 0);
        assert_eq!(none.to_string(), "<?>");
        let mut tree = Tree::default();
        assert!(!none.set(&mut tree, Value::Int32(Some(1))).unwrap());
        assert!(tree.branch.is_none());
    }

    #[test]
    fn scalar_cannot_be_descended() {
        let cache = BeanMetadataCache::new();
        let path = PropertyPath::new(&cache, BeanType::of::<Tree>(), "name.length");
        assert_eq!(path.to_string(), "name.<?>");
        assert_eq!(path.terminal_property().map(|p| p.name()), Some("name"));
        let mut tree = Tree::default();
        assert!(!path.set(&mut tree, Value::Int32(Some(1))).unwrap());
        assert_eq!(tree.name, "");
    }

    #[test]
    fn ignore_case() {
        let cache = BeanMetadataCache::new();
        let path = PropertyPath::new_ignore_case(&cache, BeanType::of::<Tree>(), "Branch.LEAF.Value");
        assert!(path.is_resolved());
        assert_eq!(path.to_string(), "branch.leaf.value");
        assert_eq!(
            PropertyPath::new(&cache, BeanType::of::<Tree>(), "Branch.leaf").to_string(),
            "<?>"
        );
    }

    #[test]
    fn returns_deepest_owner() {
        let cache = BeanMetadataCache::new();
        let path = PropertyPath::new(&cache, BeanType::of::<Tree>(), "branch.leaf.value");
        let mut tree = Tree::default();
        let owner = path.nested_object_mut(&mut tree).unwrap();
        assert!(owner.downcast_mut::<Leaf>().is_some());
    }
}
