use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Speaker label used in the exported report.
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "AstroAI",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Sender::User => "user-message",
            Sender::Bot => "bot-message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    PlainText,
    /// Application-authored markup. Sanitized on the way in.
    Markup,
}

/// Message content as stored in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Literal text, never interpreted as markup.
    Text(String),
    /// Markup that has already been through `ammonia`.
    Markup(String),
}

impl MessageBody {
    pub fn new(content: &str, mode: RenderMode) -> Self {
        match mode {
            RenderMode::PlainText => MessageBody::Text(content.to_string()),
            RenderMode::Markup => MessageBody::Markup(ammonia::clean(content)),
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        match self {
            MessageBody::Text(_) => RenderMode::PlainText,
            MessageBody::Markup(_) => RenderMode::Markup,
        }
    }

    /// The visible text, with markup stripped.
    pub fn text_content(&self) -> String {
        match self {
            MessageBody::Text(text) => text.clone(),
            MessageBody::Markup(html) => {
                let stripped = ammonia::Builder::empty().clean(html).to_string();
                decode_entities(&stripped)
            }
        }
    }
}

/// Undoes the escaping html5ever applies to text nodes.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub body: MessageBody,
    /// Marks the welcome message, which the exporter skips.
    pub initial: bool,
}

impl Message {
    pub fn new(content: &str, sender: Sender, mode: RenderMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            body: MessageBody::new(content, mode),
            initial: false,
        }
    }

    pub fn text_content(&self) -> String {
        self.body.text_content()
    }
}
