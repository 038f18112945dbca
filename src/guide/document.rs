use std::collections::HashSet;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

pub const STEP_CLASS: &str = "step";
pub const FAQ_CLASS: &str = "faq";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

/// A level-2 region of the guide. The preamble before the first level-2
/// heading is a section too, without an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub id: Option<String>,
    pub heading: Option<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// `start` is the first number of an ordered list.
    List {
        start: Option<u64>,
        items: Vec<String>,
    },
    Code(CodeBlock),
    Step(Step),
    Faq(FaqItem),
    Rule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Position among all code blocks of the document.
    pub index: usize,
    pub language: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaqItem {
    pub index: usize,
    pub question: String,
    pub answer: Vec<Block>,
}

impl GuideDocument {
    pub fn parse(markdown: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut builder = Builder::default();
        let mut capture = Capture::None;
        let mut lists: Vec<ListState> = Vec::new();

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    ..
                }) => {
                    capture = Capture::Heading {
                        level: heading_level(level),
                        id: id.map(|id| id.to_string()).filter(|id| !id.is_empty()),
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        text: String::new(),
                    };
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Capture::Heading {
                        level,
                        id,
                        classes,
                        text,
                    } = std::mem::replace(&mut capture, Capture::None)
                    {
                        builder.heading(level, collapse_whitespace(&text), id, &classes);
                    }
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    capture = Capture::Code {
                        language,
                        text: String::new(),
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Capture::Code { language, text } =
                        std::mem::replace(&mut capture, Capture::None)
                    {
                        flush_open_lists(&mut lists, &mut builder);
                        builder.code(language, text.trim_end_matches('\n').to_string());
                    }
                }
                Event::Start(Tag::Paragraph) => {
                    if lists.is_empty() {
                        capture = Capture::Paragraph(String::new());
                    }
                }
                Event::End(TagEnd::Paragraph) => {
                    if let Some(list) = lists.last_mut() {
                        list.current.push(' ');
                    } else if let Capture::Paragraph(text) =
                        std::mem::replace(&mut capture, Capture::None)
                    {
                        let text = collapse_whitespace(&text);
                        if !text.is_empty() {
                            builder.push(Block::Paragraph(text));
                        }
                    }
                }
                Event::Start(Tag::List(start)) => {
                    if let Some(parent) = lists.last_mut() {
                        parent.flush_item();
                    }
                    lists.push(ListState::new(start));
                }
                Event::End(TagEnd::List(_)) => {
                    if let Some(mut list) = lists.pop() {
                        list.flush_item();
                        match lists.last_mut() {
                            Some(parent) => parent
                                .items
                                .extend(list.items.into_iter().map(|item| format!("  {}", item))),
                            None if !list.items.is_empty() => builder.push(Block::List {
                                start: list.next_start(),
                                items: list.items,
                            }),
                            None => {}
                        }
                    }
                }
                Event::End(TagEnd::Item) => {
                    if let Some(list) = lists.last_mut() {
                        list.flush_item();
                    }
                }
                Event::Rule => {
                    if lists.is_empty() {
                        builder.push(Block::Rule);
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    append_text(&mut capture, &mut lists, &text);
                }
                Event::SoftBreak => append_text(&mut capture, &mut lists, " "),
                Event::HardBreak => append_text(&mut capture, &mut lists, "\n"),
                _ => {}
            }
        }

        builder.finish()
    }

    pub fn step_ids(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|section| section.blocks.iter())
            .filter_map(|block| match block {
                Block::Step(step) => Some(step.id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn code_block(&self, index: usize) -> Option<&CodeBlock> {
        fn find(blocks: &[Block], index: usize) -> Option<&CodeBlock> {
            blocks.iter().find_map(|block| match block {
                Block::Code(code) if code.index == index => Some(code),
                Block::Faq(faq) => find(&faq.answer, index),
                _ => None,
            })
        }

        self.sections.iter().find_map(|section| find(&section.blocks, index))
    }

    pub fn has_section(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id.as_deref() == Some(id))
    }

    pub fn word_count(&self) -> usize {
        let title_words = self.title.split_whitespace().count();
        let body_words: usize = self
            .sections
            .iter()
            .map(|section| section.visible_text().split_whitespace().count())
            .sum();
        // The preamble heading repeats the document title.
        let repeated = self
            .sections
            .first()
            .filter(|s| s.id.is_none() && s.heading.as_deref() == Some(self.title.as_str()))
            .map(|_| title_words)
            .unwrap_or(0);
        title_words + body_words - repeated
    }

    pub fn reading_time_minutes(&self, words_per_minute: usize) -> usize {
        let words = self.word_count();
        if words == 0 {
            return 0;
        }
        words.div_ceil(words_per_minute.max(1))
    }
}

impl Section {
    /// First heading found within the section.
    pub fn title(&self) -> &str {
        if let Some(heading) = &self.heading {
            return heading;
        }
        self.blocks
            .iter()
            .find_map(|block| match block {
                Block::Heading { text, .. } => Some(text.as_str()),
                Block::Step(step) => Some(step.title.as_str()),
                Block::Faq(faq) => Some(faq.question.as_str()),
                _ => None,
            })
            .unwrap_or("")
    }

    pub fn visible_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(heading) = &self.heading {
            parts.push(heading);
        }
        for block in &self.blocks {
            block.collect_text(&mut parts);
        }
        parts.retain(|part| !part.is_empty());
        parts.join("\n")
    }
}

impl Block {
    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Block::Heading { text, .. } | Block::Paragraph(text) => out.push(text),
            Block::List { items, .. } => out.extend(items.iter().map(|i| i.trim_start())),
            Block::Code(code) => out.push(&code.code),
            Block::Step(step) => out.push(&step.title),
            Block::Faq(faq) => {
                out.push(&faq.question);
                for block in &faq.answer {
                    block.collect_text(out);
                }
            }
            Block::Rule => {}
        }
    }
}

enum Capture {
    None,
    Heading {
        level: u8,
        id: Option<String>,
        classes: Vec<String>,
        text: String,
    },
    Paragraph(String),
    Code {
        language: Option<String>,
        text: String,
    },
}

struct ListState {
    start: Option<u64>,
    items: Vec<String>,
    current: String,
    /// Top-level items already emitted before a code block split the list.
    emitted: u64,
    /// The open item resumes after a code block.
    continuing: bool,
}

impl ListState {
    fn new(start: Option<u64>) -> Self {
        Self {
            start,
            items: Vec::new(),
            current: String::new(),
            emitted: 0,
            continuing: false,
        }
    }

    fn flush_item(&mut self) {
        let item = collapse_whitespace(&self.current);
        if !item.is_empty() {
            let item = if self.continuing { format!("  {}", item) } else { item };
            self.items.push(item);
        }
        self.current.clear();
        self.continuing = false;
    }

    fn next_start(&self) -> Option<u64> {
        self.start.map(|start| start + self.emitted)
    }
}

/// Emits everything the open lists hold so far, so that a code block inside
/// an item lands after the text that precedes it.
fn flush_open_lists(lists: &mut [ListState], builder: &mut Builder) {
    let Some(start) = lists.first().map(ListState::next_start) else {
        return;
    };

    let mut items = Vec::new();
    for (depth, list) in lists.iter_mut().enumerate() {
        list.flush_item();
        list.continuing = true;
        let indent = "  ".repeat(depth);
        items.extend(list.items.drain(..).map(|item| format!("{}{}", indent, item)));
    }

    let top_level = items.iter().filter(|item| !item.starts_with("  ")).count() as u64;
    if let Some(outer) = lists.first_mut() {
        outer.emitted += top_level;
    }
    if !items.is_empty() {
        builder.push(Block::List { start, items });
    }
}

fn append_text(capture: &mut Capture, lists: &mut [ListState], text: &str) {
    match capture {
        Capture::Heading { text: buf, .. } | Capture::Code { text: buf, .. } => buf.push_str(text),
        _ => {
            if let Some(list) = lists.last_mut() {
                list.current.push_str(text);
            } else if let Capture::Paragraph(buf) = capture {
                buf.push_str(text);
            }
        }
    }
}

#[derive(Default)]
struct Builder {
    title: String,
    sections: Vec<Section>,
    current: Section,
    faq: Option<FaqItem>,
    code_blocks: usize,
    faq_items: usize,
    step_ids: HashSet<String>,
}

impl Builder {
    fn push(&mut self, block: Block) {
        match &mut self.faq {
            Some(faq) => faq.answer.push(block),
            None => self.current.blocks.push(block),
        }
    }

    fn code(&mut self, language: Option<String>, code: String) {
        let index = self.code_blocks;
        self.code_blocks += 1;
        self.push(Block::Code(CodeBlock {
            index,
            language,
            code,
        }));
    }

    fn close_faq(&mut self) {
        if let Some(faq) = self.faq.take() {
            self.current.blocks.push(Block::Faq(faq));
        }
    }

    fn heading(&mut self, level: u8, text: String, id: Option<String>, classes: &[String]) {
        self.close_faq();

        if level == 1 && self.title.is_empty() {
            self.title = text.clone();
            if self.current.heading.is_none() && self.current.id.is_none() {
                self.current.heading = Some(text);
            }
            return;
        }

        if level <= 2 {
            let finished = std::mem::replace(
                &mut self.current,
                Section {
                    id,
                    heading: Some(text),
                    blocks: Vec::new(),
                },
            );
            if finished.heading.is_some() || !finished.blocks.is_empty() {
                self.sections.push(finished);
            }
            return;
        }

        let has_class = |name: &str| classes.iter().any(|c| c == name);

        if has_class(STEP_CLASS) {
            match id {
                Some(id) if self.step_ids.insert(id.clone()) => {
                    self.current.blocks.push(Block::Step(Step { id, title: text }));
                    return;
                }
                Some(id) => log::warn!("Duplicate step id '{}', rendering as heading", id),
                None => log::warn!("Step '{}' has no id, rendering as heading", text),
            }
        } else if has_class(FAQ_CLASS) {
            let index = self.faq_items;
            self.faq_items += 1;
            self.faq = Some(FaqItem {
                index,
                question: text,
                answer: Vec::new(),
            });
            return;
        }

        self.current.blocks.push(Block::Heading { level, text });
    }

    fn finish(mut self) -> GuideDocument {
        self.close_faq();
        if self.current.heading.is_some() || !self.current.blocks.is_empty() {
            self.sections.push(self.current);
        }
        GuideDocument {
            title: self.title,
            sections: self.sections,
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
