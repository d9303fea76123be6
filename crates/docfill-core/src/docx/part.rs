//! Parsed XML parts and text-slot re-emission

use super::DocxError;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

/// What a slot contributes to its run's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    /// A `w:t` element
    Text,
    /// A `w:tab` (`\t`) or a line break `w:br`/`w:cr` (`\n`)
    Char(char),
}

/// Location of one text-bearing element in a part's event list
///
/// `open == close` for an empty element such as `<w:t/>` or `<w:tab/>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextSlot {
    pub open: usize,
    pub close: usize,
    pub kind: SlotKind,
}

/// One piece of a rewritten slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Char(char),
}

/// Split run text into text and tab/break pieces
///
/// The result alternates `Text` and `Char`, starting and ending with a
/// (possibly empty) `Text`. `\r` is written as a line break.
pub(crate) fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        let ch = match ch {
            '\t' => '\t',
            '\n' | '\r' => '\n',
            _ => continue,
        };
        out.push(Segment::Text(&text[start..index]));
        out.push(Segment::Char(ch));
        start = index + 1;
    }
    out.push(Segment::Text(&text[start..]));
    out
}

/// Element name written for a tab or line break
fn char_element(ch: char) -> &'static str {
    if ch == '\t' {
        "w:tab"
    } else {
        "w:br"
    }
}

/// An XML part kept as its full event sequence
#[derive(Debug, Clone)]
pub(crate) struct XmlPart {
    pub name: String,
    pub events: Vec<Event<'static>>,
    pub slots: Vec<TextSlot>,
}

impl XmlPart {
    pub(crate) fn parse(name: &str, bytes: &[u8]) -> Result<Self, DocxError> {
        let text = std::str::from_utf8(bytes).map_err(|e| xml_error(name, e))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = Reader::from_str(text);
        let mut events = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(event) => events.push(event.into_owned()),
                Err(e) => {
                    return Err(DocxError::Xml {
                        part: name.to_string(),
                        message: format!("at byte {}: {}", reader.buffer_position(), e),
                    })
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            events,
            slots: Vec::new(),
        })
    }

    /// Decoded text content of one slot
    pub(crate) fn slot_text(&self, slot: TextSlot) -> Result<String, DocxError> {
        if let SlotKind::Char(ch) = slot.kind {
            return Ok(ch.to_string());
        }
        let mut text = String::new();
        for event in &self.events[slot.open + 1..slot.close.max(slot.open + 1)] {
            append_text(&self.name, event, &mut text)?;
        }
        Ok(text)
    }

    /// Lay the new text of a run out over its slots
    ///
    /// When the run keeps the same sequence of tabs and breaks, each stretch
    /// of text goes into the first `w:t` between the same pair of tab/break
    /// elements and those elements stay where they are. Otherwise the whole
    /// text is written at the run's first slot and the remaining slots are
    /// emptied (`w:t`) or dropped (tabs and breaks).
    ///
    /// Returns `false` when the run has nowhere to hold non-empty text.
    pub(crate) fn layout_run<'a>(
        &self,
        run_slots: &[usize],
        text: &'a str,
        overrides: &mut HashMap<usize, Vec<Segment<'a>>>,
    ) -> bool {
        let pieces = segments(text);
        let chars: Vec<(usize, char)> = run_slots
            .iter()
            .filter_map(|&slot| match self.slots.get(slot)?.kind {
                SlotKind::Char(ch) => Some((slot, ch)),
                SlotKind::Text => None,
            })
            .collect();
        let new_chars: Vec<char> = pieces
            .iter()
            .filter_map(|piece| match piece {
                Segment::Char(ch) => Some(*ch),
                Segment::Text(_) => None,
            })
            .collect();

        if new_chars.iter().eq(chars.iter().map(|(_, ch)| ch)) {
            let texts: Vec<&'a str> = pieces
                .iter()
                .filter_map(|piece| match piece {
                    Segment::Text(text) => Some(*text),
                    Segment::Char(_) => None,
                })
                .collect();
            self.layout_aligned(run_slots, &chars, &texts, overrides)
        } else {
            let Some((&first, rest)) = run_slots.split_first() else {
                return text.is_empty();
            };
            overrides.insert(first, pieces);
            for &slot in rest {
                overrides.insert(slot, Vec::new());
            }
            true
        }
    }

    fn layout_aligned<'a>(
        &self,
        run_slots: &[usize],
        chars: &[(usize, char)],
        texts: &[&'a str],
        overrides: &mut HashMap<usize, Vec<Segment<'a>>>,
    ) -> bool {
        let mut placed = vec![false; texts.len()];
        let mut gap = 0;
        for &slot in run_slots {
            match self.slots.get(slot).map(|s| s.kind) {
                Some(SlotKind::Char(_)) => gap += 1,
                Some(SlotKind::Text) if !placed[gap] => {
                    overrides.insert(slot, vec![Segment::Text(texts[gap])]);
                    placed[gap] = true;
                }
                Some(SlotKind::Text) => {
                    overrides.insert(slot, Vec::new());
                }
                None => {}
            }
        }

        // Text between tabs/breaks that had no w:t of its own
        for (gap, &text) in texts.iter().enumerate() {
            if placed[gap] || text.is_empty() {
                continue;
            }
            let Some(&(slot, ch)) = chars.get(gap.saturating_sub(1)) else {
                return false;
            };
            let pieces = overrides
                .entry(slot)
                .or_insert_with(|| vec![Segment::Char(ch)]);
            if gap == 0 {
                pieces.insert(0, Segment::Text(text));
            } else {
                pieces.push(Segment::Text(text));
            }
        }
        true
    }

    /// Re-emit the part, replacing the given slots with new pieces
    pub(crate) fn render(
        &self,
        overrides: &HashMap<usize, Vec<Segment<'_>>>,
    ) -> Result<Vec<u8>, DocxError> {
        let by_open: HashMap<usize, (TextSlot, &[Segment<'_>])> = overrides
            .iter()
            .filter_map(|(&index, pieces)| {
                self.slots
                    .get(index)
                    .map(|slot| (slot.open, (*slot, pieces.as_slice())))
            })
            .collect();

        let mut writer = Writer::new(Vec::new());
        let mut index = 0;
        while index < self.events.len() {
            if let Some(&(slot, pieces)) = by_open.get(&index) {
                self.write_slot(&mut writer, slot, pieces)?;
                index = slot.close + 1;
                continue;
            }
            self.write(&mut writer, self.events[index].clone())?;
            index += 1;
        }

        Ok(writer.into_inner())
    }

    /// A `w:t` slot always keeps its element, emptied if nothing lands in it.
    /// A tab/break slot keeps its original element for the first matching
    /// `Char` piece and disappears otherwise.
    fn write_slot(
        &self,
        writer: &mut Writer<Vec<u8>>,
        slot: TextSlot,
        pieces: &[Segment<'_>],
    ) -> Result<(), DocxError> {
        let mut reused = false;
        for piece in pieces {
            match (*piece, slot.kind) {
                (Segment::Text(text), SlotKind::Text) if !reused => {
                    self.write_text(writer, self.slot_start(slot)?, text)?;
                    reused = true;
                }
                (Segment::Text(""), _) => {}
                (Segment::Text(text), _) => {
                    self.write_text(writer, BytesStart::new("w:t"), text)?;
                }
                (Segment::Char(ch), SlotKind::Char(own)) if ch == own && !reused => {
                    for event in &self.events[slot.open..=slot.close] {
                        self.write(writer, event.clone())?;
                    }
                    reused = true;
                }
                (Segment::Char(ch), _) => {
                    self.write(writer, Event::Empty(BytesStart::new(char_element(ch))))?;
                }
            }
        }

        if slot.kind == SlotKind::Text && !reused {
            self.write_text(writer, self.slot_start(slot)?, "")?;
        }
        Ok(())
    }

    fn slot_start(&self, slot: TextSlot) -> Result<BytesStart<'static>, DocxError> {
        match &self.events[slot.open] {
            Event::Start(start) | Event::Empty(start) => Ok(start.clone().into_owned()),
            other => Err(DocxError::Xml {
                part: self.name.clone(),
                message: format!("text slot does not start an element: {:?}", other),
            }),
        }
    }

    fn write_text(
        &self,
        writer: &mut Writer<Vec<u8>>,
        start: BytesStart<'_>,
        text: &str,
    ) -> Result<(), DocxError> {
        let start = with_space_preserved(&start, text, &self.name)?;
        let end = start.to_end().into_owned();

        self.write(writer, Event::Start(start))?;
        if !text.is_empty() {
            self.write(writer, Event::Text(BytesText::new(text)))?;
        }
        self.write(writer, Event::End(end))
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DocxError> {
        writer
            .write_event(event)
            .map_err(|e| xml_error(&self.name, e))?;
        Ok(())
    }
}

/// Append the decoded text of a character-data event
pub(crate) fn append_text(part: &str, event: &Event, out: &mut String) -> Result<(), DocxError> {
    match event {
        Event::Text(text) => {
            let decoded = text.unescape().map_err(|e| xml_error(part, e))?;
            out.push_str(&decoded);
        }
        Event::CData(data) => out.push_str(&String::from_utf8_lossy(data)),
        _ => {}
    }
    Ok(())
}

/// Copy of `start` carrying `xml:space="preserve"` when `text` needs it
fn with_space_preserved(
    start: &BytesStart<'_>,
    text: &str,
    part: &str,
) -> Result<BytesStart<'static>, DocxError> {
    let mut start = start.clone().into_owned();
    let needs_preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    if !needs_preserve {
        return Ok(start);
    }

    let has_space_attr = start
        .try_get_attribute("xml:space")
        .map_err(|e| xml_error(part, e))?
        .is_some();
    if !has_space_attr {
        start.push_attribute(("xml:space", "preserve"));
    }
    Ok(start)
}

pub(crate) fn xml_error(part: &str, err: impl std::fmt::Display) -> DocxError {
    DocxError::Xml {
        part: part.to_string(),
        message: err.to_string(),
    }
}
