use std::rc::Rc;

pub type ViewId = u64;

pub type Callback = Rc<dyn Fn()>;

#[derive(Clone)]
pub enum ViewKind {
    Column,
    Text { text: String },
    Button { text: String, on_click: Option<Callback> },
}

impl std::fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Column => write!(f, "Column"),
            ViewKind::Text { text } => f.debug_struct("Text").field("text", text).finish(),
            ViewKind::Button { text, .. } => f
                .debug_struct("Button")
                .field("text", text)
                .field("on_click", &"<callback>")
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub children: Vec<View>,
}

impl View {
    pub fn new(id: ViewId, kind: ViewKind) -> Self {
        View {
            id,
            kind,
            children: vec![],
        }
    }

    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }

    /// Depth-first search for the first button labelled `label`.
    pub fn find_button(&self, label: &str) -> Option<Callback> {
        if let ViewKind::Button { text, on_click } = &self.kind
            && text == label
        {
            return on_click.clone();
        }
        self.children.iter().find_map(|c| c.find_button(label))
    }

    /// One line per leaf, depth-first. Buttons render as `[label]`.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_lines(&mut out);
        out
    }

    fn collect_lines(&self, out: &mut Vec<String>) {
        match &self.kind {
            ViewKind::Column => {}
            ViewKind::Text { text } => out.push(text.clone()),
            ViewKind::Button { text, .. } => out.push(format!("[{text}]")),
        }
        for child in &self.children {
            child.collect_lines(out);
        }
    }
}
