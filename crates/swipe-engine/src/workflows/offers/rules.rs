use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Single trigger inside a rule table.
///
/// Keywords match case-insensitively on word boundaries; patterns are raw regular
/// expressions compiled with the case-insensitive flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Keyword(String),
    Pattern(String),
}

impl Trigger {
    pub fn keyword(value: &str) -> Self {
        Self::Keyword(value.to_string())
    }

    pub fn pattern(value: &str) -> Self {
        Self::Pattern(value.to_string())
    }

    fn to_regex_source(&self) -> Option<String> {
        match self {
            Trigger::Keyword(keyword) => {
                let keyword = keyword.trim();
                if keyword.is_empty() {
                    return None;
                }
                let mut source = String::from("(?i)");
                if keyword.chars().next().is_some_and(char::is_alphanumeric) {
                    source.push_str(r"\b");
                }
                source.push_str(&regex::escape(keyword));
                if keyword.chars().last().is_some_and(char::is_alphanumeric) {
                    source.push_str(r"\b");
                }
                Some(source)
            }
            Trigger::Pattern(pattern) => {
                if pattern.trim().is_empty() {
                    None
                } else {
                    Some(format!("(?i){pattern}"))
                }
            }
        }
    }
}

/// Persuasive role a detected segment plays in the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    Promise,
    Mechanism,
    Proof,
    CallToAction,
}

impl FieldRole {
    pub const ALL: [FieldRole; 4] = [
        FieldRole::Promise,
        FieldRole::Mechanism,
        FieldRole::Proof,
        FieldRole::CallToAction,
    ];
}

/// How heavily a compliance alert weighs on the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn weight(&self) -> u32 {
        match self {
            AlertSeverity::Low => 10,
            AlertSeverity::Medium => 20,
            AlertSeverity::High => 30,
            AlertSeverity::Critical => 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub role: FieldRole,
    pub triggers: Vec<Trigger>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    pub label: String,
    pub severity: AlertSeverity,
    pub triggers: Vec<Trigger>,
}

/// Triggers that raise the intrinsic offer score when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSignalRules {
    pub price: Vec<Trigger>,
    pub guarantee: Vec<Trigger>,
}

/// Declarative trigger tables for detection, compliance, and offer signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    pub fields: Vec<FieldRule>,
    pub alerts: Vec<AlertRule>,
    pub offer_signals: OfferSignalRules,
    /// Words ignored when building keyword sets for corpus similarity.
    #[serde(default)]
    pub stopwords: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RuleBookError {
    #[error("failed to read rule book: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rule book JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid trigger pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RuleBook {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleBookError> {
        let book: RuleBook = serde_json::from_reader(reader)?;
        // Fail on bad patterns at load time rather than on first use.
        book.compile()?;
        Ok(book)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleBookError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn triggers_for(&self, role: FieldRole) -> impl Iterator<Item = &Trigger> {
        self.fields
            .iter()
            .filter(move |rule| rule.role == role)
            .flat_map(|rule| rule.triggers.iter())
    }

    pub fn compile(&self) -> Result<CompiledRules, RuleBookError> {
        let mut fields = Vec::with_capacity(FieldRole::ALL.len());
        for role in FieldRole::ALL {
            fields.push((role, compile_triggers(self.triggers_for(role))?));
        }

        let alerts = self
            .alerts
            .iter()
            .map(|rule| {
                Ok(CompiledAlert {
                    label: rule.label.clone(),
                    severity: rule.severity,
                    matchers: compile_triggers(rule.triggers.iter())?,
                })
            })
            .collect::<Result<Vec<_>, RuleBookError>>()?;

        Ok(CompiledRules {
            fields,
            alerts,
            price: compile_triggers(self.offer_signals.price.iter())?,
            guarantee: compile_triggers(self.offer_signals.guarantee.iter())?,
            stopwords: self
                .stopwords
                .iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        })
    }

    /// Built-in tables tuned for Portuguese and English direct-response copy.
    pub fn standard() -> Self {
        Self {
            fields: vec![
                FieldRule {
                    role: FieldRole::Promise,
                    triggers: keywords(&[
                        "perca", "emagreça", "emagrecer", "elimine", "secar", "conquiste",
                        "transforme", "ganhe", "ganhar dinheiro", "renda extra", "livre de",
                        "acabe com", "resultado", "resultados", "lose", "get rid of", "achieve",
                        "transform", "earn", "make money", "without", "sem precisar",
                    ])
                    .into_iter()
                    .chain([
                        Trigger::pattern(r"\d+\s?kg"),
                        Trigger::pattern(r"\bem\s+\d+\s+(dias|semanas|meses)\b"),
                        Trigger::pattern(r"\bin\s+\d+\s+(days|weeks|months)\b"),
                    ])
                    .collect(),
                },
                FieldRule {
                    role: FieldRole::Mechanism,
                    triggers: keywords(&[
                        "método", "metodo", "protocolo", "sistema", "fórmula", "formula",
                        "segredo", "técnica", "tecnica", "passo a passo", "como funciona",
                        "descoberta", "ingrediente", "truque", "ritual", "method", "system",
                        "secret", "technique", "step-by-step", "how it works", "protocol",
                        "trick", "discovery", "ingredient",
                    ]),
                },
                FieldRule {
                    role: FieldRole::Proof,
                    triggers: keywords(&[
                        "depoimento", "depoimentos", "clientes", "alunos", "alunas",
                        "comprovado", "comprovada", "estudo", "pesquisa", "científico",
                        "cientificamente", "aprovado", "avaliações", "estrelas",
                        "testimonial", "testimonials", "customers", "students", "proven",
                        "study", "clinically", "reviews", "stars", "backed by",
                    ])
                    .into_iter()
                    .chain([
                        Trigger::pattern(r"\b\d+([.,]\d+)?\s?(mil\b|k\b|%)"),
                        Trigger::pattern(r"mais de\s+\d+"),
                        Trigger::pattern(r"over\s+\d+"),
                    ])
                    .collect(),
                },
                FieldRule {
                    role: FieldRole::CallToAction,
                    triggers: keywords(&[
                        "compre", "clique", "saiba mais", "garanta", "acesse", "inscreva",
                        "aproveite", "peça", "quero", "link na bio", "toque", "buy", "shop now",
                        "click", "learn more", "sign up", "order now", "get yours", "join",
                        "download", "claim",
                    ]),
                },
            ],
            alerts: vec![
                AlertRule {
                    label: "Health claim".to_string(),
                    severity: AlertSeverity::Critical,
                    triggers: keywords(&[
                        "cura", "curar", "emagreça", "emagrecer", "queima gordura",
                        "diabetes", "pressão alta", "sem dieta", "cure", "cures",
                        "burn fat", "fat burning", "weight loss",
                    ])
                    .into_iter()
                    .chain([
                        Trigger::pattern(r"(perca|perder|lose)\s+\d+\s?(kg|quilos|lbs|pounds)"),
                    ])
                    .collect(),
                },
                AlertRule {
                    label: "Guaranteed results".to_string(),
                    severity: AlertSeverity::High,
                    triggers: keywords(&[
                        "garantido", "garantida", "resultado garantido", "100% garantido",
                        "sem falhas", "funciona para todos", "guaranteed", "100% guaranteed",
                        "works for everyone", "never fails",
                    ]),
                },
                AlertRule {
                    label: "Financial promise".to_string(),
                    severity: AlertSeverity::High,
                    triggers: keywords(&[
                        "fique rico", "renda extra", "dinheiro fácil", "renda passiva",
                        "independência financeira", "get rich", "easy money",
                        "passive income", "financial freedom",
                    ])
                    .into_iter()
                    .chain([
                        Trigger::pattern(r"(ganhe|fature|lucre)\s+(r\$\s?)?\d+"),
                        Trigger::pattern(r"(earn|make)\s+\$\s?\d+"),
                    ])
                    .collect(),
                },
                AlertRule {
                    label: "Personal data request".to_string(),
                    severity: AlertSeverity::High,
                    triggers: keywords(&[
                        "cpf", "senha", "dados bancários", "cartão de crédito",
                        "número do cartão", "password", "social security", "bank details",
                        "credit card number",
                    ]),
                },
                AlertRule {
                    label: "Before and after".to_string(),
                    severity: AlertSeverity::Medium,
                    triggers: keywords(&["antes e depois", "before and after", "before/after"]),
                },
                AlertRule {
                    label: "Personal attributes".to_string(),
                    severity: AlertSeverity::Medium,
                    triggers: keywords(&[
                        "você está acima do peso", "você é gordo", "você tem dívidas",
                        "are you overweight", "are you in debt", "your diabetes",
                    ]),
                },
                AlertRule {
                    label: "Artificial urgency".to_string(),
                    severity: AlertSeverity::Low,
                    triggers: keywords(&[
                        "só hoje", "últimas unidades", "últimas vagas", "acaba hoje",
                        "corra", "antes que saia do ar", "only today", "last chance",
                        "ends tonight", "hurry",
                    ]),
                },
                AlertRule {
                    label: "Unverifiable superlative".to_string(),
                    severity: AlertSeverity::Low,
                    triggers: keywords(&[
                        "o melhor do mundo", "o único", "milagre", "milagroso",
                        "revolucionário", "best in the world", "the only", "miracle",
                        "revolutionary",
                    ]),
                },
            ],
            offer_signals: OfferSignalRules {
                price: keywords(&["reais", "grátis", "gratis", "desconto", "free", "discount", "off"])
                    .into_iter()
                    .chain([
                        Trigger::pattern(r"r\$\s?\d"),
                        Trigger::pattern(r"(us)?\$\s?\d"),
                        Trigger::pattern(r"€\s?\d"),
                        Trigger::pattern(r"\d+\s?%\s?(off|de desconto)"),
                    ])
                    .collect(),
                guarantee: keywords(&[
                    "garantia", "garantido", "garantida", "dinheiro de volta", "reembolso",
                    "devolvemos", "guarantee", "guaranteed", "money back", "refund",
                    "risk-free",
                ]),
            },
            stopwords: [
                "a", "o", "as", "os", "de", "da", "do", "das", "dos", "e", "em", "no", "na",
                "nos", "nas", "um", "uma", "que", "para", "com", "por", "seu", "sua", "seus",
                "suas", "você", "voce", "mais", "isso", "esse", "essa", "como", "the", "and",
                "for", "you", "your", "with", "this", "that", "are", "from", "our",
            ]
            .iter()
            .map(|word| word.to_string())
            .collect(),
        }
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

fn keywords(values: &[&str]) -> Vec<Trigger> {
    values.iter().map(|value| Trigger::keyword(value)).collect()
}

fn compile_triggers<'a, I>(triggers: I) -> Result<Vec<Regex>, RuleBookError>
where
    I: Iterator<Item = &'a Trigger>,
{
    triggers
        .filter_map(|trigger| trigger.to_regex_source())
        .map(|source| {
            Regex::new(&source).map_err(|source_err| RuleBookError::Pattern {
                pattern: source.clone(),
                source: source_err,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledAlert {
    pub label: String,
    pub severity: AlertSeverity,
    pub matchers: Vec<Regex>,
}

/// Rule book with every trigger compiled to a regular expression.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    fields: Vec<(FieldRole, Vec<Regex>)>,
    pub(crate) alerts: Vec<CompiledAlert>,
    pub(crate) price: Vec<Regex>,
    pub(crate) guarantee: Vec<Regex>,
    pub(crate) stopwords: HashSet<String>,
}

impl CompiledRules {
    pub(crate) fn matchers_for(&self, role: FieldRole) -> &[Regex] {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map(|(_, matchers)| matchers.as_slice())
            .unwrap_or(&[])
    }
}

/// Built-in rule book compiled once per process. A compile failure is logged once and the
/// free functions fall back to empty results.
pub(crate) fn standard_rules() -> Option<Arc<CompiledRules>> {
    static STANDARD: OnceLock<Option<Arc<CompiledRules>>> = OnceLock::new();
    STANDARD
        .get_or_init(|| compile_or_log(&RuleBook::standard()))
        .clone()
}

fn compile_or_log(book: &RuleBook) -> Option<Arc<CompiledRules>> {
    match book.compile() {
        Ok(rules) => Some(Arc::new(rules)),
        Err(err) => {
            error!(error = %err, "built-in rule book failed to compile");
            None
        }
    }
}

pub(crate) fn any_match(matchers: &[Regex], text: &str) -> bool {
    matchers.iter().any(|matcher| matcher.is_match(text))
}
