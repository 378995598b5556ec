// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming reader for gzip-compressed AppStream catalog documents.
//!
//! Produces raw [`Component`] descriptors one at a time so callers can stop
//! between components. Only the untranslated (`C`) variant of localised
//! elements is kept.

use flate2::read::MultiGzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::errors::{CatalogError, Result};

/// Elements whose text flows into the surrounding paragraph.
const INLINE_ELEMENTS: &[&[u8]] = &[b"em", b"code"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    DesktopApp,
    ConsoleApp,
    WebApp,
    Runtime,
    Addon,
    Font,
    Generic,
    Other,
}

impl ComponentKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            None | Some("") | Some("generic") => Self::Generic,
            Some("desktop-application") | Some("desktop") => Self::DesktopApp,
            Some("console-application") => Self::ConsoleApp,
            Some("web-application") => Self::WebApp,
            Some("runtime") => Self::Runtime,
            Some("addon") => Self::Addon,
            Some("font") => Self::Font,
            Some(_) => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Stock,
    Cached,
    Local,
    Remote,
    Unknown,
}

impl IconKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("stock") => Self::Stock,
            Some("cached") => Self::Cached,
            Some("local") => Self::Local,
            Some("remote") => Self::Remote,
            _ => Self::Unknown,
        }
    }
}

/// URL kinds carried onto catalog records. Other AppStream URL kinds
/// (faq, help, translate, ...) are not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    Donation,
    Homepage,
    Bugtracker,
}

impl UrlKind {
    pub const ALL: [UrlKind; 3] = [UrlKind::Donation, UrlKind::Homepage, UrlKind::Bugtracker];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "donation" => Some(Self::Donation),
            "homepage" => Some(Self::Homepage),
            "bugtracker" => Some(Self::Bugtracker),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Homepage => "homepage",
            Self::Bugtracker => "bugtracker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub kind: IconKind,
    /// URL for remote icons, file name for cached icons, path or stock name otherwise
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// `None` when the release carries no `version` attribute
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub kind: String,
    pub id: String,
}

/// One `<component>` entry as it appears in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    pub id: Option<String>,
    pub name: String,
    pub summary: String,
    pub description: String,
    pub developer: String,
    pub releases: Vec<Release>,
    pub icons: Vec<Icon>,
    pub urls: Vec<(UrlKind, String)>,
    pub categories: Vec<String>,
    pub bundles: Vec<Bundle>,
}

impl Component {
    fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            id: None,
            name: String::new(),
            summary: String::new(),
            description: String::new(),
            developer: String::new(),
            releases: Vec::new(),
            icons: Vec::new(),
            urls: Vec::new(),
            categories: Vec::new(),
            bundles: Vec::new(),
        }
    }

    /// First bundle id of the given bundle type (e.g. `flatpak`)
    pub fn bundle_id(&self, kind: &str) -> Option<&str> {
        self.bundles
            .iter()
            .find(|bundle| bundle.kind == kind && !bundle.id.is_empty())
            .map(|bundle| bundle.id.as_str())
    }

    pub fn url(&self, kind: UrlKind) -> Option<&str> {
        self.urls
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, url)| url.as_str())
    }

    pub fn first_icon(&self, kind: IconKind) -> Option<&str> {
        self.icons
            .iter()
            .find(|icon| icon.kind == kind)
            .map(|icon| icon.value.as_str())
    }
}

/// Pull-based reader over the components of one catalog document
pub struct CatalogReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    path: PathBuf,
    /// Inside the root `<components>` element
    in_root: bool,
    finished: bool,
}

impl CatalogReader<BufReader<MultiGzDecoder<File>>> {
    /// Open a gzip-compressed catalog, reading every gzip member in the file.
    /// The file handle lives as long as the reader.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| CatalogError::io(path, err))?;
        Ok(Self::from_reader(
            BufReader::new(MultiGzDecoder::new(file)),
            path,
        ))
    }
}

impl<R: BufRead> CatalogReader<R> {
    /// Read an already-decompressed document. `path` is only used in errors.
    pub fn from_reader(inner: R, path: &Path) -> Self {
        Self {
            reader: Reader::from_reader(inner),
            buf: Vec::new(),
            path: path.to_path_buf(),
            in_root: false,
            finished: false,
        }
    }

    pub fn next_component(&mut self) -> Result<Option<Component>> {
        if self.finished {
            return Ok(None);
        }

        let mut builder: Option<ComponentBuilder> = None;
        loop {
            self.buf.clear();
            let position = self.reader.buffer_position();
            let event = self.reader.read_event_into(&mut self.buf).map_err(|err| {
                CatalogError::parse(&self.path, format!("{err} (near byte {position})"))
            })?;

            match event {
                Event::Start(start) => match builder.as_mut() {
                    Some(current) => current.open(&start, &self.path)?,
                    None if start.name().as_ref() == b"component" => {
                        builder = Some(ComponentBuilder::new(&start, &self.path)?);
                    }
                    None if start.name().as_ref() == b"components" => self.in_root = true,
                    None => {}
                },
                Event::Empty(start) => match builder.as_mut() {
                    Some(current) => {
                        current.open(&start, &self.path)?;
                        current.close();
                    }
                    None if start.name().as_ref() == b"component" => {
                        let empty = ComponentBuilder::new(&start, &self.path)?;
                        return Ok(Some(empty.finish()));
                    }
                    None => {}
                },
                Event::Text(text) => {
                    if let Some(current) = builder.as_mut() {
                        let text = text
                            .unescape()
                            .map_err(|err| CatalogError::parse(&self.path, err))?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = builder.as_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(end) => match builder.as_mut() {
                    Some(current) => {
                        if current.stack.is_empty() && end.name().as_ref() == b"component" {
                            if let Some(done) = builder.take() {
                                return Ok(Some(done.finish()));
                            }
                        } else {
                            current.close();
                        }
                    }
                    None if end.name().as_ref() == b"components" => self.in_root = false,
                    None => {}
                },
                Event::Eof => {
                    self.finished = true;
                    if builder.is_some() {
                        return Err(CatalogError::parse(
                            &self.path,
                            "document ended inside <component>",
                        ));
                    }
                    if self.in_root {
                        return Err(CatalogError::parse(
                            &self.path,
                            "document ended inside <components>",
                        ));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for CatalogReader<R> {
    type Item = Result<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_component() {
            Ok(Some(component)) => Some(Ok(component)),
            Ok(None) => None,
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

struct OpenElement {
    name: Vec<u8>,
    /// `type` for icon/url/bundle elements
    kind: Option<String>,
}

struct ComponentBuilder {
    component: Component,
    stack: Vec<OpenElement>,
    text: String,
    /// Stack depth at which a localised subtree began
    skip_from: Option<usize>,
    paragraphs: Vec<String>,
    list_items: Vec<String>,
}

impl ComponentBuilder {
    fn new(start: &BytesStart<'_>, path: &Path) -> Result<Self> {
        let kind = attribute(start, b"type", path)?;
        Ok(Self {
            component: Component::new(ComponentKind::from_tag(kind.as_deref())),
            stack: Vec::new(),
            text: String::new(),
            skip_from: None,
            paragraphs: Vec::new(),
            list_items: Vec::new(),
        })
    }

    fn open(&mut self, start: &BytesStart<'_>, path: &Path) -> Result<()> {
        let name = start.name().as_ref().to_vec();

        if self.skip_from.is_none() {
            if let Some(lang) = attribute(start, b"xml:lang", path)? {
                if lang != "C" {
                    self.skip_from = Some(self.stack.len());
                }
            }
        }

        let kind = match name.as_slice() {
            b"icon" | b"url" | b"bundle" => attribute(start, b"type", path)?,
            _ => None,
        };

        if self.skip_from.is_none()
            && name.as_slice() == b"release"
            && self.parent() == Some(b"releases".as_slice())
        {
            let version = attribute(start, b"version", path)?;
            self.component.releases.push(Release { version });
        }

        if !INLINE_ELEMENTS.contains(&name.as_slice()) {
            self.text.clear();
        }
        self.stack.push(OpenElement { name, kind });
        Ok(())
    }

    fn close(&mut self) {
        let Some(element) = self.stack.pop() else {
            return;
        };

        if let Some(depth) = self.skip_from {
            if depth == self.stack.len() {
                self.skip_from = None;
                self.text.clear();
            }
            return;
        }

        let depth = self.stack.len();
        let parent = self.stack.last().map(|open| open.name.clone());
        match (parent.as_deref(), element.name.as_slice()) {
            (None, b"id") => self.component.id = Some(self.take_text()),
            (None, b"name") => self.component.name = self.take_text(),
            (None, b"summary") => self.component.summary = self.take_text(),
            (None, b"developer_name") => self.component.developer = self.take_text(),
            (Some(b"developer"), b"name") => self.component.developer = self.take_text(),
            (None, b"icon") => {
                let value = self.take_text();
                self.component.icons.push(Icon {
                    kind: IconKind::from_tag(element.kind.as_deref()),
                    value,
                });
            }
            (None, b"url") => {
                let value = self.take_text();
                if let Some(kind) = element.kind.as_deref().and_then(UrlKind::from_tag) {
                    self.component.urls.push((kind, value));
                }
            }
            (None, b"bundle") => {
                let id = self.take_text();
                self.component.bundles.push(Bundle {
                    kind: element.kind.unwrap_or_default(),
                    id,
                });
            }
            (Some(b"categories"), b"category") => {
                let category = self.take_text();
                if !category.is_empty() {
                    self.component.categories.push(category);
                }
            }
            (Some(b"description"), b"p") if depth == 1 => {
                let paragraph = collapse_whitespace(&self.take_text());
                self.paragraphs.push(paragraph);
            }
            (Some(b"ul") | Some(b"ol"), b"li") if depth == 2 => {
                let item = collapse_whitespace(&self.take_text());
                self.list_items.push(format!("- {item}"));
            }
            (Some(b"description"), b"ul" | b"ol") if depth == 1 => {
                let items = std::mem::take(&mut self.list_items);
                self.paragraphs.push(items.join("\n"));
            }
            (None, b"description") => {
                let paragraphs = std::mem::take(&mut self.paragraphs);
                self.component.description = paragraphs.join("\n\n");
            }
            _ => {}
        }
    }

    fn parent(&self) -> Option<&[u8]> {
        self.stack.last().map(|open| open.name.as_slice())
    }

    fn take_text(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        text.trim().to_string()
    }

    fn finish(self) -> Component {
        self.component
    }
}

fn attribute(start: &BytesStart<'_>, key: &[u8], path: &Path) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(|err| CatalogError::parse(path, err))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| CatalogError::parse(path, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
