//! Programme page parser.
//!
//! Pipeline:
//!   raw HTML
//!     └─ sanitize()     → no script/style bodies, `&nbsp;` as spaces
//!          └─ quick-xml events (lenient: unmatched and mismatched ends pass)
//!               └─ table/row/cell state machine → ProgramPage

use std::borrow::Cow;

use quick_xml::{
  Reader,
  events::{BytesStart, BytesText, Event},
};

use crate::error::{Error, Result};

// ─── Output ──────────────────────────────────────────────────────────────────

/// One subject row of a programme table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRow {
  pub shortcut: String,
  pub name:     String,
  pub credits:  u32,
  /// Subject type as printed, e.g. `P` or `V`.
  pub kind:     String,
  /// Completion mode, e.g. `ZaZk`.
  pub end:      String,
  pub link:     String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramTable {
  pub rows: Vec<ProgramRow>,
}

/// Everything the refresh needs from one programme page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramPage {
  /// Text of the first `main p strong`, e.g. `BIT` or `NADE`.
  pub specialization: String,
  /// Tables in document order: winter then summer, year by year.
  pub tables:         Vec<ProgramTable>,
}

impl ProgramPage {
  /// Tables that hold semester plans. An odd trailing table lists extra
  /// optional subjects and is left out.
  pub fn semester_tables(&self) -> &[ProgramTable] {
    let count = self.tables.len();
    if count % 2 == 1 { &self.tables[..count - 1] } else { &self.tables[..] }
  }
}

// ─── Sanitizing ──────────────────────────────────────────────────────────────

/// Remove `<tag ...>...</tag>` blocks, case-insensitively.
fn strip_element(html: &str, tag: &str) -> String {
  let lower = html.to_ascii_lowercase();
  let open = format!("<{tag}");
  let close = format!("</{tag}>");

  let mut out = String::with_capacity(html.len());
  let mut pos = 0;
  while let Some(start) = lower[pos..].find(&open).map(|i| pos + i) {
    out.push_str(&html[pos..start]);
    match lower[start..].find(&close) {
      Some(end) => pos = start + end + close.len(),
      None => {
        pos = html.len();
        break;
      }
    }
  }
  out.push_str(&html[pos..]);
  out
}

fn sanitize(html: &str) -> String {
  let html = strip_element(html, "script");
  let html = strip_element(&html, "style");
  html.replace("&nbsp;", " ")
}

// ─── Event helpers ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
  Main,
  P,
  Strong,
  Table,
  Tbody,
  Tr,
  Th,
  Td,
  A,
  Other,
}

impl Tag {
  fn of(name: &[u8]) -> Self {
    const TAGS: [(&[u8], Tag); 9] = [
      (b"main", Tag::Main),
      (b"p", Tag::P),
      (b"strong", Tag::Strong),
      (b"table", Tag::Table),
      (b"tbody", Tag::Tbody),
      (b"tr", Tag::Tr),
      (b"th", Tag::Th),
      (b"td", Tag::Td),
      (b"a", Tag::A),
    ];
    TAGS
      .iter()
      .find(|(n, _)| n.eq_ignore_ascii_case(name))
      .map_or(Tag::Other, |(_, tag)| *tag)
  }
}

fn text_of<'a>(t: &'a BytesText<'_>) -> Cow<'a, str> {
  match t.unescape() {
    Ok(text) => text,
    Err(_) => String::from_utf8_lossy(t),
  }
}

fn href_of(e: &BytesStart<'_>) -> Option<String> {
  e.html_attributes()
    .flatten()
    .find(|a| a.key.as_ref().eq_ignore_ascii_case(b"href"))
    .map(|a| match a.unescape_value() {
      Ok(v) => v.into_owned(),
      Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
    })
}

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Cell {
  text: Vec<String>,
  link: Option<String>,
}

impl Cell {
  fn text(&self) -> String { self.text.join(" ") }
}

#[derive(Debug, Default)]
struct RowCells {
  headers: Vec<Cell>,
  data:    Vec<Cell>,
}

impl RowCells {
  /// `th` holds the shortcut; `td`s hold name (with link), credits, type,
  /// completion. Rows without a header cell are not subject rows.
  fn into_row(self) -> Result<Option<ProgramRow>> {
    let Some(header) = self.headers.first() else {
      return Ok(None);
    };
    let shortcut = header.text();
    let malformed = |problem: &str| Error::MalformedRow {
      shortcut: shortcut.clone(),
      problem:  problem.to_owned(),
    };

    let [name, credits, kind, end, ..] = self.data.as_slice() else {
      return Err(malformed("fewer than four data cells"));
    };
    let link = name.link.clone().ok_or_else(|| malformed("name has no link"))?;
    let credits = credits
      .text()
      .trim()
      .parse()
      .map_err(|_| malformed("credits are not a number"))?;

    Ok(Some(ProgramRow {
      shortcut: shortcut.clone(),
      name: name.text(),
      credits,
      kind: kind.text(),
      end: end.text(),
      link,
    }))
  }
}

#[derive(Default)]
struct Parser {
  tables:         Vec<ProgramTable>,
  in_tbody:       bool,
  row:            Option<RowCells>,
  cell:           Option<(Tag, Cell)>,
  main_depth:     u32,
  p_depth:        u32,
  specialization: Option<String>,
  capturing:      Option<String>,
}

impl Parser {
  fn close_cell(&mut self) {
    if let (Some((tag, cell)), Some(row)) = (self.cell.take(), self.row.as_mut()) {
      match tag {
        Tag::Th => row.headers.push(cell),
        _ => row.data.push(cell),
      }
    }
  }

  fn close_row(&mut self) -> Result<()> {
    self.close_cell();
    if let Some(cells) = self.row.take() {
      if let (Some(row), Some(table)) = (cells.into_row()?, self.tables.last_mut()) {
        table.rows.push(row);
      }
    }
    Ok(())
  }

  fn start(&mut self, tag: Tag, e: &BytesStart<'_>) -> Result<()> {
    match tag {
      Tag::Main => self.main_depth += 1,
      Tag::P => self.p_depth += 1,
      Tag::Strong => {
        let inside = self.main_depth > 0 && self.p_depth > 0;
        if inside && self.specialization.is_none() && self.capturing.is_none() {
          self.capturing = Some(String::new());
        }
      }
      Tag::Table => {
        self.close_row()?;
        self.tables.push(ProgramTable::default());
      }
      Tag::Tbody => self.in_tbody = true,
      Tag::Tr if self.in_tbody => {
        self.close_row()?;
        self.row = Some(RowCells::default());
      }
      Tag::Th | Tag::Td if self.row.is_some() => {
        self.close_cell();
        self.cell = Some((tag, Cell::default()));
      }
      Tag::A => {
        if let Some((_, cell)) = self.cell.as_mut() {
          if cell.link.is_none() {
            cell.link = href_of(e);
          }
        }
      }
      _ => {}
    }
    Ok(())
  }

  fn end(&mut self, tag: Tag) -> Result<()> {
    match tag {
      Tag::Main => self.main_depth = self.main_depth.saturating_sub(1),
      Tag::P => self.p_depth = self.p_depth.saturating_sub(1),
      Tag::Strong => {
        if let Some(text) = self.capturing.take() {
          self.specialization = Some(text.trim().to_owned());
        }
      }
      Tag::Th | Tag::Td => self.close_cell(),
      Tag::Tr => self.close_row()?,
      Tag::Tbody | Tag::Table => {
        self.close_row()?;
        self.in_tbody = false;
      }
      _ => {}
    }
    Ok(())
  }

  fn text(&mut self, text: &str) {
    if let Some(buf) = self.capturing.as_mut() {
      buf.push_str(text);
    }
    if let Some((_, cell)) = self.cell.as_mut() {
      let text = text.trim();
      if !text.is_empty() {
        cell.text.push(text.to_owned());
      }
    }
  }
}

/// Parse a programme page into its subject tables.
pub fn parse_program(html: &str) -> Result<ProgramPage> {
  let html = sanitize(html);
  let mut reader = Reader::from_str(&html);
  let config = reader.config_mut();
  config.trim_text(true);
  config.check_end_names = false;
  config.allow_unmatched_ends = true;

  let mut parser = Parser::default();
  loop {
    match reader.read_event()? {
      Event::Start(ref e) => parser.start(Tag::of(e.name().as_ref()), e)?,
      Event::Empty(ref e) => {
        let tag = Tag::of(e.name().as_ref());
        parser.start(tag, e)?;
        parser.end(tag)?;
      }
      Event::End(ref e) => parser.end(Tag::of(e.name().as_ref()))?,
      Event::Text(ref t) => parser.text(&text_of(t)),
      Event::CData(ref t) => parser.text(&String::from_utf8_lossy(t)),
      Event::Eof => break,
      _ => {}
    }
  }
  parser.close_row()?;

  let specialization = parser
    .specialization
    .filter(|s| !s.is_empty())
    .ok_or(Error::MissingSpecialization)?;
  Ok(ProgramPage { specialization, tables: parser.tables })
}

#[cfg(test)]
pub(crate) mod fixtures {
  /// One table of a programme page in the layout the catalog uses.
  pub fn table(rows: &[(&str, &str, u32, &str)]) -> String {
    let body: String = rows
      .iter()
      .map(|(code, name, credits, kind)| {
        format!(
          "<tr><th>{code}</th><td><a href=\"/course/{code}\">{name}</a></td>\
           <td>{credits}</td><td>{kind}</td><td>ZaZk</td></tr>"
        )
      })
      .collect();
    format!(
      "<table><thead><tr><th>Code</th><th>Name</th></tr></thead><tbody>{body}</tbody></table>"
    )
  }

  pub fn page(specialization: &str, tables: &[String]) -> String {
    format!(
      "<!DOCTYPE html><html lang=cs><head><meta charset=utf-8>\
       <script>if (a < b && c) {{ run(); }}</script>\
       <style>td > a {{ color: red }}</style></head>\
       <body><main><h1>Programme</h1><p>Specialization <strong>{specialization}</strong></p>\
       {}<br></main></body></html>",
      tables.concat()
    )
  }
}

#[cfg(test)]
mod tests {
  use super::{fixtures::*, *};

  #[test]
  fn parses_rows_and_specialization() {
    let html = page("BIT", &[
      table(&[("IZP", "Programming&nbsp;Basics", 7, "P"), ("IEL", "Circuits", 6, "P")]),
      table(&[("IUS", "Software Engineering", 5, "V")]),
    ]);
    let parsed = parse_program(&html).unwrap();

    assert_eq!(parsed.specialization, "BIT");
    assert_eq!(parsed.tables.len(), 2);
    let first = &parsed.tables[0].rows[0];
    assert_eq!(first.shortcut, "IZP");
    assert_eq!(first.name, "Programming Basics");
    assert_eq!(first.credits, 7);
    assert_eq!(first.kind, "P");
    assert_eq!(first.end, "ZaZk");
    assert_eq!(first.link, "/course/IZP");
    assert_eq!(parsed.tables[1].rows[0].kind, "V");
  }

  #[test]
  fn header_rows_outside_tbody_are_ignored() {
    let parsed = parse_program(&page("MITAI", &[table(&[("SUI", "AI", 5, "P")])])).unwrap();
    assert_eq!(parsed.tables[0].rows.len(), 1);
  }

  #[test]
  fn odd_trailing_table_is_dropped() {
    let tables: Vec<String> = (0..5).map(|_| table(&[])).collect();
    let parsed = parse_program(&page("BIT", &tables)).unwrap();
    assert_eq!(parsed.tables.len(), 5);
    assert_eq!(parsed.semester_tables().len(), 4);

    let parsed = parse_program(&page("BIT", &tables[..2])).unwrap();
    assert_eq!(parsed.semester_tables().len(), 2);
  }

  #[test]
  fn missing_specialization_is_an_error() {
    let html = format!("<html><body><main>{}</main></body></html>", table(&[]));
    assert!(matches!(parse_program(&html), Err(Error::MissingSpecialization)));
  }

  #[test]
  fn non_numeric_credits_are_rejected() {
    let html = page("BIT", &[table(&[("IZP", "Basics", 7, "P")]).replace(">7<", ">seven<")]);
    assert!(matches!(
      parse_program(&html),
      Err(Error::MalformedRow { shortcut, .. }) if shortcut == "IZP"
    ));
  }

  #[test]
  fn script_and_style_bodies_are_stripped() {
    let cleaned = sanitize("a<SCRIPT>x < y</script>b<style>p{}</style>c&nbsp;d");
    assert_eq!(cleaned, "abc d");
  }
}
