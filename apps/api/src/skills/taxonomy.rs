//! Skill taxonomy: canonical skills, their aliases, and the category each belongs to.
//!
//! Built once per process and never mutated. Keep aliases lower-case; they are run
//! through the same cleaning as user input when the lookup tables are built.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::skills::normalizer::{clean, compact_key};

/// Taxonomy parent used to find transferable skills for a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    ProgrammingLanguage,
    MachineLearning,
    DataAnalysis,
    Statistics,
    HealthSciences,
    Databases,
    CloudDevops,
    WebDevelopment,
    Collaboration,
}

/// A single canonical skill in the taxonomy.
#[derive(Debug)]
pub struct TaxonomyEntry {
    pub canonical: &'static str,
    pub label: &'static str,
    pub category: SkillCategory,
    /// Lower-case alternative spellings; also scanned for in free text.
    pub aliases: &'static [&'static str],
    /// Short upper-case tokens matched case-sensitively in free text only ("R", "ML").
    pub acronyms: &'static [&'static str],
}

use SkillCategory::*;

const fn entry(
    canonical: &'static str,
    label: &'static str,
    category: SkillCategory,
    aliases: &'static [&'static str],
    acronyms: &'static [&'static str],
) -> TaxonomyEntry {
    TaxonomyEntry {
        canonical,
        label,
        category,
        aliases,
        acronyms,
    }
}

pub static TAXONOMY: &[TaxonomyEntry] = &[
    // Programming languages
    entry("python", "Python", ProgrammingLanguage, &["python3", "python 3", "py"], &[]),
    entry("r", "R", ProgrammingLanguage, &["r language", "r programming", "rstats"], &["R"]),
    entry("sql", "SQL", Databases, &["structured query language", "t-sql", "tsql"], &[]),
    entry("java", "Java", ProgrammingLanguage, &["java 8", "java 11", "java 17"], &[]),
    entry("javascript", "JavaScript", ProgrammingLanguage, &["js", "ecmascript", "es6"], &[]),
    entry("typescript", "TypeScript", ProgrammingLanguage, &["ts"], &[]),
    entry("rust", "Rust", ProgrammingLanguage, &["rust lang", "rustlang"], &[]),
    entry("golang", "Go", ProgrammingLanguage, &["go lang", "go language"], &["Golang"]),
    entry("c++", "C++", ProgrammingLanguage, &["cpp", "c plus plus"], &[]),
    entry("c#", "C#", ProgrammingLanguage, &["csharp", "c sharp"], &["C#"]),
    entry("scala", "Scala", ProgrammingLanguage, &[], &[]),
    entry("julia", "Julia", ProgrammingLanguage, &["julia lang"], &[]),
    entry("matlab", "MATLAB", ProgrammingLanguage, &[], &[]),
    entry("sas", "SAS", Statistics, &["sas programming"], &["SAS"]),
    // Machine learning and AI
    entry(
        "machine learning",
        "Machine Learning",
        MachineLearning,
        &["ml", "machine-learning", "statistical learning"],
        &["ML"],
    ),
    entry("deep learning", "Deep Learning", MachineLearning, &["dl", "neural networks", "neural network"], &[]),
    entry(
        "artificial intelligence",
        "Artificial Intelligence",
        MachineLearning,
        &["ai"],
        &["AI"],
    ),
    entry(
        "natural language processing",
        "Natural Language Processing",
        MachineLearning,
        &["nlp"],
        &["NLP"],
    ),
    entry("computer vision", "Computer Vision", MachineLearning, &["cv models"], &[]),
    entry("large language models", "Large Language Models", MachineLearning, &["llm", "llms"], &["LLM", "LLMs"]),
    entry("pytorch", "PyTorch", MachineLearning, &["torch", "py torch"], &[]),
    entry("tensorflow", "TensorFlow", MachineLearning, &["tensor flow", "tf"], &[]),
    entry("scikit-learn", "scikit-learn", MachineLearning, &["sklearn", "scikit learn"], &[]),
    entry("mlops", "MLOps", MachineLearning, &["ml ops", "model deployment"], &[]),
    // Data analysis
    entry("data science", "Data Science", DataAnalysis, &["data scientist"], &[]),
    entry("data analysis", "Data Analysis", DataAnalysis, &["data analytics", "analytics"], &[]),
    entry("data visualization", "Data Visualization", DataAnalysis, &["dataviz", "data viz", "visualisation"], &[]),
    entry("pandas", "pandas", DataAnalysis, &["python pandas"], &[]),
    entry("numpy", "NumPy", DataAnalysis, &["numerical python"], &[]),
    entry("spark", "Apache Spark", DataAnalysis, &["apache spark", "pyspark"], &[]),
    entry("etl", "ETL", DataAnalysis, &["data pipelines", "data pipeline"], &["ETL"]),
    entry("tableau", "Tableau", DataAnalysis, &[], &[]),
    // Statistics and experimentation
    entry("statistics", "Statistics", Statistics, &["statistical analysis", "stats"], &[]),
    entry("causal inference", "Causal Inference", Statistics, &["causal analysis", "causality"], &[]),
    entry(
        "randomized controlled trials",
        "Randomized Controlled Trials",
        HealthSciences,
        &["rct", "rcts", "randomised controlled trials", "randomized trials"],
        &["RCT", "RCTs"],
    ),
    entry("a/b testing", "A/B Testing", Statistics, &["ab testing", "experimentation", "split testing"], &[]),
    entry("bayesian statistics", "Bayesian Statistics", Statistics, &["bayesian inference", "bayesian methods"], &[]),
    entry("biostatistics", "Biostatistics", HealthSciences, &["biostats"], &[]),
    entry("econometrics", "Econometrics", Statistics, &[], &[]),
    entry("time series analysis", "Time Series Analysis", Statistics, &["time series", "forecasting"], &[]),
    // Health and life sciences
    entry(
        "health data analysis",
        "Health Data Analysis",
        HealthSciences,
        &["health data", "healthcare data", "health analytics", "clinical data analysis"],
        &[],
    ),
    entry("clinical trials", "Clinical Trials", HealthSciences, &["clinical research"], &[]),
    entry("epidemiology", "Epidemiology", HealthSciences, &[], &[]),
    entry("bioinformatics", "Bioinformatics", HealthSciences, &["computational biology"], &[]),
    entry("electronic health records", "Electronic Health Records", HealthSciences, &["ehr", "emr"], &["EHR", "EMR"]),
    entry("pharmacology", "Pharmacology", HealthSciences, &["pharmaceutical", "pharma"], &[]),
    entry("biotech", "Biotechnology", HealthSciences, &["biotechnology"], &[]),
    // Databases
    entry("postgresql", "PostgreSQL", Databases, &["postgres", "psql"], &[]),
    entry("mysql", "MySQL", Databases, &["mariadb"], &[]),
    entry("mongodb", "MongoDB", Databases, &["mongo"], &[]),
    entry("redis", "Redis", Databases, &[], &[]),
    entry("elasticsearch", "Elasticsearch", Databases, &["elastic search"], &[]),
    entry("data modeling", "Data Modeling", Databases, &["data modelling", "database design"], &[]),
    // Cloud and DevOps
    entry("docker", "Docker", CloudDevops, &["containerization", "docker containers"], &[]),
    entry("kubernetes", "Kubernetes", CloudDevops, &["k8s"], &[]),
    entry("aws", "AWS", CloudDevops, &["amazon web services"], &["AWS"]),
    entry("gcp", "Google Cloud", CloudDevops, &["google cloud platform", "google cloud"], &["GCP"]),
    entry("azure", "Azure", CloudDevops, &["microsoft azure"], &[]),
    entry("terraform", "Terraform", CloudDevops, &["infrastructure as code", "iac"], &[]),
    entry("ci/cd", "CI/CD", CloudDevops, &["continuous integration", "continuous delivery", "cicd"], &[]),
    entry("git", "Git", Collaboration, &["github", "gitlab", "version control"], &[]),
    entry("linux", "Linux", CloudDevops, &["unix"], &[]),
    // Web development
    entry("react", "React", WebDevelopment, &["reactjs", "react.js"], &[]),
    entry("node.js", "Node.js", WebDevelopment, &["nodejs", "node js"], &[]),
    entry("django", "Django", WebDevelopment, &["django rest framework"], &[]),
    entry("fastapi", "FastAPI", WebDevelopment, &["fast api"], &[]),
    entry("flask", "Flask", WebDevelopment, &[], &[]),
    entry("rest apis", "REST APIs", WebDevelopment, &["restful apis", "rest api", "restful api", "api design"], &[]),
    entry("graphql", "GraphQL", WebDevelopment, &[], &[]),
    // Collaboration
    entry("agile", "Agile", Collaboration, &["scrum", "kanban"], &[]),
    entry("project management", "Project Management", Collaboration, &[], &[]),
    entry("communication", "Communication", Collaboration, &["stakeholder communication"], &[]),
];

/// Cleaned alias (or canonical) → index into `TAXONOMY`.
static ALIAS_INDEX: LazyLock<HashMap<String, usize>> = LazyLock::new(|| {
    let mut raw: HashMap<String, String> = HashMap::new();
    for e in TAXONOMY {
        raw.entry(clean(e.canonical))
            .or_insert_with(|| clean(e.canonical));
    }
    for e in TAXONOMY {
        for alias in e.aliases {
            // First registration wins; a canonical name is never shadowed by an alias.
            raw.entry(clean(alias)).or_insert_with(|| clean(e.canonical));
        }
    }
    let closed = close_aliases(raw);

    let by_canonical: HashMap<String, usize> = TAXONOMY
        .iter()
        .enumerate()
        .map(|(i, e)| (clean(e.canonical), i))
        .collect();

    closed
        .into_iter()
        .filter_map(|(alias, canonical)| by_canonical.get(&canonical).map(|&i| (alias, i)))
        .collect()
});

/// Compact key (no spaces, dots or hyphens) → index into `TAXONOMY`.
static COMPACT_INDEX: LazyLock<HashMap<String, usize>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    let mut keys: Vec<(&String, &usize)> = ALIAS_INDEX.iter().collect();
    // Deterministic winner when two aliases collapse to the same compact key.
    keys.sort();
    for (alias, &idx) in keys {
        map.entry(compact_key(alias)).or_insert(idx);
    }
    map
});

/// Follows alias chains until every key maps to a terminal canonical name.
///
/// A terminal is a value that maps to itself (or is absent). Chains longer than the
/// table, which can only happen with a cycle, keep their last resolved value.
fn close_aliases(raw: HashMap<String, String>) -> HashMap<String, String> {
    let bound = raw.len();
    raw.iter()
        .map(|(alias, target)| {
            let mut current = target.clone();
            for _ in 0..bound {
                match raw.get(&current) {
                    Some(next) if *next != current => current = next.clone(),
                    _ => break,
                }
            }
            (alias.clone(), current)
        })
        .collect()
}

/// Resolves an already-cleaned mention to its taxonomy entry.
pub fn lookup(cleaned: &str) -> Option<&'static TaxonomyEntry> {
    ALIAS_INDEX
        .get(cleaned)
        .or_else(|| COMPACT_INDEX.get(&compact_key(cleaned)))
        .map(|&i| &TAXONOMY[i])
}

/// The category of a canonical skill name, if the taxonomy knows it.
pub fn category_of(canonical: &str) -> Option<SkillCategory> {
    lookup(canonical).map(|e| e.category)
}
