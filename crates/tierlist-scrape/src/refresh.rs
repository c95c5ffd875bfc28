//! Walking programme pages and merging every listed subject.

use serde::{Deserialize, Serialize};
use tierlist_core::{
  merge::{self, MergePlan, ScrapedSubject},
  store::CatalogStore,
  subject::{Degree, Semester, Shortcut},
};
use tracing::{info, warn};

use crate::{
  error::{Error, Result},
  parse::{ProgramPage, ProgramRow},
  source::ProgramSource,
};

/// One programme page to scrape and the degree its subjects belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
  pub url:    String,
  pub degree: Degree,
}

/// The bachelor programme page followed by the master field pages.
pub fn default_sources() -> Vec<CatalogSource> {
  let bachelor = CatalogSource {
    url:    "https://www.fit.vut.cz/study/program/18/.cs".to_owned(),
    degree: Degree::Bachelor,
  };
  let masters = (31..=46).map(|id| CatalogSource {
    url:    format!("https://www.fit.vut.cz/study/field/{id}/.cs"),
    degree: Degree::Master,
  });
  std::iter::once(bachelor).chain(masters).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
  pub pages:    usize,
  pub subjects: usize,
  /// Merges that changed the store.
  pub changed:  usize,
}

/// Year tag a row contributes: `{year}{specialization}` for compulsory subjects
/// (`L{specialization}` for master years past the second), `VBIT`/`VMIT` otherwise.
pub fn year_tag(kind: &str, degree: Degree, year: u32, specialization: &str) -> String {
  match (kind == "P", degree) {
    (true, Degree::Master) if year > 2 => format!("L{specialization}"),
    (true, _) => format!("{year}{specialization}"),
    (false, degree) => format!("V{degree}"),
  }
}

fn scraped(
  row: &ProgramRow,
  semester: Semester,
  year: u32,
  degree: Degree,
  specialization: &str,
) -> Result<ScrapedSubject> {
  Ok(ScrapedSubject {
    shortcut: Shortcut::new(&row.shortcut)?,
    name: row.name.clone(),
    credits: row.credits,
    semester,
    end: row.end.clone(),
    link: row.link.clone(),
    kind: row.kind.clone(),
    year: year_tag(&row.kind, degree, year, specialization),
    degree,
  })
}

/// Subjects listed on `page`, tagged with the semester and year of the table
/// they appear in. Tables alternate winter and summer; the year advances
/// every two tables.
pub fn subjects_on(page: &ProgramPage, degree: Degree) -> Result<Vec<ScrapedSubject>> {
  let mut subjects = Vec::new();
  for (index, table) in page.semester_tables().iter().enumerate() {
    let semester = if index % 2 == 0 { Semester::Z } else { Semester::L };
    let year = u32::try_from(index / 2 + 1).unwrap_or(u32::MAX);
    for row in &table.rows {
      subjects.push(scraped(row, semester, year, degree, &page.specialization)?);
    }
  }
  Ok(subjects)
}

async fn merge_page<S>(store: &S, subjects: &[ScrapedSubject]) -> Result<usize>
where
  S: CatalogStore,
{
  let mut changed = 0;
  for subject in subjects {
    let plan = merge::merge(store, subject)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    if plan != MergePlan::Unchanged {
      changed += 1;
    }
  }
  Ok(changed)
}

/// Scrape every source in order and merge what they list.
///
/// The first failing page aborts the refresh; merges already applied stay.
pub async fn refresh<S, P>(store: &S, source: &P, sources: &[CatalogSource]) -> Result<RefreshReport>
where
  S: CatalogStore,
  P: ProgramSource,
{
  let mut report = RefreshReport::default();
  for catalog in sources {
    let page = source.fetch(&catalog.url).await.inspect_err(|e| {
      warn!(url = %catalog.url, error = %e, "programme page unavailable");
    })?;
    let subjects = subjects_on(&page, catalog.degree)?;
    let changed = merge_page(store, &subjects).await?;

    info!(
      url = %catalog.url,
      specialization = %page.specialization,
      subjects = subjects.len(),
      changed,
      "programme page merged"
    );
    report.pages += 1;
    report.subjects += subjects.len();
    report.changed += changed;
  }
  Ok(report)
}
