use super::handle::Handle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Structural part of a node: the part the sentinels share with real nodes.
#[derive(Clone, Debug)]
pub(crate) struct Link {
    pub(crate) left: Handle,
    pub(crate) right: Handle,
    pub(crate) parent: Handle,
    pub(crate) color: Color,
    /// Sum of the own weights of every node in this subtree, this node included.
    /// Always 0.0 for both sentinels.
    pub(crate) weight: f64,
}

impl Link {
    /// A black, weightless link with every pointer at `nil`.
    pub(crate) const fn sentinel() -> Self {
        Self {
            left: Handle::NIL,
            right: Handle::NIL,
            parent: Handle::NIL,
            color: Color::Black,
            weight: 0.0,
        }
    }

    /// Link of a freshly created node: red, childless, carrying only its own weight.
    pub(crate) const fn leaf(parent: Handle, own_weight: f64) -> Self {
        Self {
            left: Handle::NIL,
            right: Handle::NIL,
            parent,
            color: Color::Red,
            weight: own_weight,
        }
    }
}

pub(crate) struct Node<K, V> {
    pub(crate) link: Link,
    // The weigher's value for `key`, computed and validated once at insertion.
    pub(crate) own_weight: f64,
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, parent: Handle, own_weight: f64) -> Self {
        Self {
            link: Link::leaf(parent, own_weight),
            own_weight,
            key,
            value,
        }
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
