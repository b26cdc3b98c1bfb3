//! Editorial content endpoints. These are static documents as far as the
//! client is concerned; nothing in the catalog invalidates them.

use staffroom_core::{CareerArticle, RequestSpec, Result, SalaryBand, Tag, TagKind};

use crate::envelope;
use crate::handle::{Binder, QueryHandle};
use crate::registry::QueryDef;

pub struct ContentEndpoints {
    pub career_guide: QueryHandle<(), Vec<CareerArticle>>,
    pub salary_guide: QueryHandle<(), Vec<SalaryBand>>,
}

impl ContentEndpoints {
    pub(crate) fn register(bind: &Binder) -> Result<Self> {
        Ok(Self {
            career_guide: bind.query(
                QueryDef::new(
                    "careerGuide",
                    |_: &()| RequestSpec::get("/content/career-guide"),
                    |_, _| vec![Tag::item(TagKind::Content, "career-guide")],
                )
                .with_transform(envelope::articles),
            )?,
            salary_guide: bind.query(
                QueryDef::new(
                    "salaryGuide",
                    |_: &()| RequestSpec::get("/content/salary-guide"),
                    |_, _| vec![Tag::item(TagKind::Content, "salary-guide")],
                )
                .with_transform(envelope::bands),
            )?,
        })
    }
}
