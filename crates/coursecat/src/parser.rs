use std::sync::LazyLock;

use crate::types::{CourseRecord, NOT_AVAILABLE};

use scraper::{ElementRef, Html, Selector};

const DEPARTMENT_PREFIX: &str = "/thecollege/";

/// Path keywords under `/thecollege/` that are catalog sections, not departments.
const EXCLUDED_SECTIONS: [&str; 12] = [
    "thecurriculum",
    "minors",
    "academicregulationsprocedures",
    "examinationcreditandtransfercredit",
    "transfercredit",
    "interdisciplinaryopportunities",
    "jointdegreeprograms",
    "offcampusstudyprograms",
    "preparationforprofessionalstudy",
    "researchopportunities",
    "archives",
    "academiccalendar",
];

const INSTRUCTOR_LABEL: &str = "Instructor(s):";
const TERMS_OFFERED_LABEL: &str = "Terms Offered:";
const EQUIVALENT_COURSES_LABEL: &str = "Equivalent Course(s):";
const PREREQUISITE_LABEL: &str = "Prerequisite(s):";

static SEL_PROGRAMS_OF_STUDY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href="/thecollege/programsofstudy/"]"#)
        .expect("invalid selector: programs of study")
});
static SEL_ANCHOR_WITH_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: anchor"));
static SEL_MAIN_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class="courseblock main"]"#).expect("invalid selector: main block")
});
static SEL_SUBSEQUENCE_BLOCK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class="courseblock subsequence"]"#)
        .expect("invalid selector: subsequence block")
});
static SEL_BLOCK_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p.courseblocktitle").expect("invalid selector: block title")
});
static SEL_BLOCK_DESC: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p.courseblockdesc").expect("invalid selector: block description")
});
static SEL_BLOCK_DETAIL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p.courseblockdetail").expect("invalid selector: block detail")
});

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Text of an element with every text node on its own line, so `<br>`
/// separated entries come out as separate lines.
fn elem_lines(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join("\n")
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Finds the "Programs of Study" anchor on the landing page and returns its
/// raw `href`.
pub fn parse_programs_of_study_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&SEL_PROGRAMS_OF_STUDY)
        .next()
        .and_then(|e| e.value().attr("href"))
        .map(str::to_string)
}

pub fn is_department_href(href: &str) -> bool {
    href.starts_with(DEPARTMENT_PREFIX)
        && href.ends_with('/')
        && !EXCLUDED_SECTIONS.iter().any(|keyword| href.contains(keyword))
}

/// Every department page `href` on the Programs of Study page, in page order.
/// Duplicates are kept.
pub fn parse_department_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&SEL_ANCHOR_WITH_HREF)
        .filter_map(|e| e.value().attr("href"))
        .filter(|href| is_department_href(href))
        .map(str::to_string)
        .collect()
}

/// Parses every course block on a department page. Main blocks come first,
/// then subsequence blocks, each group in document order. Blocks are matched
/// on the whole `class` value, so `main courseblock` is not a course block.
pub fn parse_course_blocks(html: &str) -> Vec<CourseRecord> {
    let document = Html::parse_document(html);

    document
        .select(&SEL_MAIN_BLOCK)
        .chain(document.select(&SEL_SUBSEQUENCE_BLOCK))
        .filter_map(parse_course_block)
        .collect()
}

fn parse_course_block(block: ElementRef) -> Option<CourseRecord> {
    let detail = block.select(&SEL_BLOCK_DETAIL).next()?;

    let Some(description) = block
        .select(&SEL_BLOCK_DESC)
        .next()
        .and_then(|e| non_empty(&elem_text(e)))
    else {
        log::debug!(
            "Skipping course block without description: {}",
            block
                .select(&SEL_BLOCK_TITLE)
                .next()
                .map(|e| elem_text(e).trim().to_string())
                .unwrap_or_default()
        );
        return None;
    };

    let course_number = block
        .select(&SEL_BLOCK_TITLE)
        .next()
        .map(|e| course_number_from_title(&elem_text(e)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let fields = parse_detail(&elem_lines(detail));

    Some(CourseRecord {
        course_number,
        description,
        instructor: fields.instructor,
        terms_offered: fields.terms_offered,
        equivalent_courses: fields.equivalent_courses,
        prerequisite: fields.prerequisite,
    })
}

/// `ECON 101. Introduction to Economics` → `ECON 101`.
///
/// Non-ASCII characters are dropped before splitting, so a non-breaking space
/// between subject and number disappears entirely.
pub fn course_number_from_title(title: &str) -> String {
    let ascii: String = title.trim().chars().filter(char::is_ascii).collect();
    ascii
        .split('.')
        .next()
        .and_then(non_empty)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub instructor: String,
    pub terms_offered: String,
    pub equivalent_courses: String,
    pub prerequisite: String,
}

impl Default for DetailFields {
    fn default() -> Self {
        Self {
            instructor: NOT_AVAILABLE.to_string(),
            terms_offered: NOT_AVAILABLE.to_string(),
            equivalent_courses: NOT_AVAILABLE.to_string(),
            prerequisite: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DetailField {
    EquivalentCourses,
    Prerequisite,
}

#[derive(Debug, Clone, Copy)]
enum DetailRule {
    /// `Instructor(s): …` with an optional `Terms Offered: …` trailing on the
    /// same line. Terms Offered is not recognised anywhere else.
    InstructorAndTerms,
    Labelled(&'static str, DetailField),
}

/// Tried in order against each line; the first rule whose label is present
/// claims the line.
const DETAIL_RULES: [DetailRule; 3] = [
    DetailRule::InstructorAndTerms,
    DetailRule::Labelled(EQUIVALENT_COURSES_LABEL, DetailField::EquivalentCourses),
    DetailRule::Labelled(PREREQUISITE_LABEL, DetailField::Prerequisite),
];

/// Text between the first occurrence of `label` and the next one (or the end
/// of the line).
fn after_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.split(label).nth(1)
}

impl DetailRule {
    fn apply(self, line: &str, fields: &mut DetailFields) -> bool {
        match self {
            DetailRule::InstructorAndTerms => {
                let Some(rest) = after_label(line, INSTRUCTOR_LABEL) else {
                    return false;
                };
                let instructor = match rest.split_once(TERMS_OFFERED_LABEL) {
                    Some((instructor, terms)) => {
                        let terms = terms.split(TERMS_OFFERED_LABEL).next().unwrap_or(terms);
                        if let Some(terms) = non_empty(terms) {
                            fields.terms_offered = terms;
                        }
                        instructor
                    }
                    None => rest,
                };
                if let Some(instructor) = non_empty(instructor) {
                    fields.instructor = instructor;
                }
                true
            }
            DetailRule::Labelled(label, field) => {
                let Some(value) = after_label(line, label) else {
                    return false;
                };
                if let Some(value) = non_empty(value) {
                    match field {
                        DetailField::EquivalentCourses => fields.equivalent_courses = value,
                        DetailField::Prerequisite => fields.prerequisite = value,
                    }
                }
                true
            }
        }
    }
}

/// Scans the detail text line by line for labelled fields. A field whose
/// label never appears keeps the `N/A` sentinel; a later matching line
/// overrides an earlier one.
pub fn parse_detail(text: &str) -> DetailFields {
    let mut fields = DetailFields::default();
    for line in text.lines() {
        // any() stops at the first rule that claims the line
        DETAIL_RULES.iter().any(|rule| rule.apply(line, &mut fields));
    }
    fields
}
