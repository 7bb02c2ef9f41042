use std::sync::Arc;

/// Text producer evaluated every time the element's text is read.
///
/// Used for regions whose text tracks a bound property.
pub type TextFn = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone, Default)]
pub enum Content {
    #[default]
    None,
    Text(String),
    /// Text computed at read time, so it always reflects its source.
    Dynamic(TextFn),
    Children(Vec<super::Element>),
}

impl Content {
    /// Child elements, empty for leaf content.
    pub fn children(&self) -> &[super::Element] {
        match self {
            Content::Children(children) => children,
            _ => &[],
        }
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Dynamic(text) => write!(f, "Dynamic({:?})", text()),
            Self::Children(c) => write!(f, "Children({c:?})"),
        }
    }
}
