//! # 病害目录
//!
//! ## 设计思路
//!
//! 静态查找表：作物名 → 病害记录列表。图片模式下对该作物的记录做均匀随机选择；
//! 文本模式下先按症状关键词缩小候选池，再随机选择（见 `symptoms`）。
//! 未知作物统一返回兜底记录 `General Plant Stress`，调用方无需处理“查无此作物”。
//!
//! ## 实现思路
//!
//! - 记录本身是 `'static` 数据，选择结果直接借用，不做拷贝。
//! - 目录与每个作物的症状 `RegexSet` 通过 `once_cell::sync::Lazy` 在首次使用时构建。
//! - 随机源由调用方注入，测试可使用固定种子。

use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::SliceRandom;
use regex::RegexSet;
use serde::Serialize;
use std::collections::BTreeMap;

/// 严重程度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// 单条病害记录。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRecord {
    pub name: &'static str,
    /// 置信度（百分比，0~100）。
    pub confidence: u8,
    pub severity: Severity,
    pub treatments: &'static [&'static str],
    pub prevention: &'static [&'static str],
    /// 文本模式的症状关键词（正则），不对外序列化。
    #[serde(skip)]
    pub symptoms: &'static [&'static str],
}

/// 未知作物时的兜底记录。
pub static FALLBACK_RECORD: DiseaseRecord = DiseaseRecord {
    name: "General Plant Stress",
    confidence: 60,
    severity: Severity::Low,
    treatments: &[
        "Check soil moisture and adjust watering",
        "Remove visibly damaged leaves",
        "Consult a local agricultural extension officer",
    ],
    prevention: &[
        "Keep a regular watering schedule",
        "Inspect plants weekly for early signs of disease",
    ],
    symptoms: &[],
};

static TOMATO: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Early Blight",
        confidence: 87,
        severity: Severity::Moderate,
        treatments: &[
            "Remove and destroy infected lower leaves",
            "Apply a copper-based or chlorothalonil fungicide every 7-10 days",
            "Mulch around the base to stop soil splashing onto leaves",
        ],
        prevention: &[
            "Rotate tomatoes with non-solanaceous crops for 2-3 years",
            "Water at the base in the morning",
            "Space plants for good air circulation",
        ],
        symptoms: &[r"\bconcentric\b", r"\btarget\b", r"\bbrown spots?\b", r"\blower leaves\b"],
    },
    DiseaseRecord {
        name: "Late Blight",
        confidence: 91,
        severity: Severity::High,
        treatments: &[
            "Remove and bag infected plants immediately",
            "Apply a mancozeb or chlorothalonil fungicide to healthy plants",
        ],
        prevention: &[
            "Plant certified disease-free transplants",
            "Avoid overhead irrigation",
            "Destroy volunteer potato and tomato plants",
        ],
        symptoms: &[r"\bwater[- ]soaked\b", r"\bwhite (mold|fuzz)\b", r"\bgr[ae]y\b", r"\brapid(ly)?\b"],
    },
    DiseaseRecord {
        name: "Septoria Leaf Spot",
        confidence: 82,
        severity: Severity::Moderate,
        treatments: &[
            "Prune affected leaves",
            "Apply a fungicide containing chlorothalonil or copper",
        ],
        prevention: &[
            "Clear plant debris at the end of the season",
            "Stake plants to keep foliage off the ground",
        ],
        symptoms: &[r"\bsmall (round )?spots?\b", r"\bdark (border|edge|margin)s?\b", r"\byellow(ing)?\b"],
    },
];

static POTATO: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Late Blight",
        confidence: 90,
        severity: Severity::High,
        treatments: &[
            "Destroy infected haulms before harvest",
            "Apply a systemic fungicide such as metalaxyl with mancozeb",
        ],
        prevention: &[
            "Use certified seed tubers",
            "Hill soil over tubers to shield them from spores",
        ],
        symptoms: &[r"\bwater[- ]soaked\b", r"\bwhite (mold|fuzz)\b", r"\bblack(ened)?\b", r"\brot(ting)?\b"],
    },
    DiseaseRecord {
        name: "Early Blight",
        confidence: 85,
        severity: Severity::Moderate,
        treatments: &[
            "Apply chlorothalonil or mancozeb at first symptoms",
            "Remove infected foliage",
        ],
        prevention: &[
            "Maintain balanced nitrogen fertilisation",
            "Rotate crops away from solanaceous hosts",
        ],
        symptoms: &[r"\bconcentric\b", r"\btarget\b", r"\bbrown spots?\b", r"\bold(er)? leaves\b"],
    },
];

static CORN: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Northern Corn Leaf Blight",
        confidence: 86,
        severity: Severity::Moderate,
        treatments: &[
            "Apply a strobilurin or triazole fungicide at tasseling if lesions reach the ear leaf",
        ],
        prevention: &[
            "Plant resistant hybrids",
            "Till or remove infected residue",
        ],
        symptoms: &[r"\bcigar\b", r"\blong (grey|gray|tan) lesions?\b", r"\blesions?\b"],
    },
    DiseaseRecord {
        name: "Common Rust",
        confidence: 88,
        severity: Severity::Low,
        treatments: &["Apply a foliar fungicide if pustules spread above the ear"],
        prevention: &[
            "Choose rust-resistant hybrids",
            "Plant early to avoid peak spore periods",
        ],
        symptoms: &[r"\brust(y)?\b", r"\bpustules?\b", r"\borange\b", r"\breddish[- ]brown\b"],
    },
    DiseaseRecord {
        name: "Gray Leaf Spot",
        confidence: 80,
        severity: Severity::Moderate,
        treatments: &["Apply a strobilurin fungicide at early disease onset"],
        prevention: &[
            "Rotate with soybean or small grains",
            "Reduce surface residue",
        ],
        symptoms: &[r"\brectangular\b", r"\bgr[ae]y spots?\b", r"\bbetween (the )?veins\b"],
    },
];

static RICE: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Rice Blast",
        confidence: 89,
        severity: Severity::High,
        treatments: &[
            "Apply tricyclazole or isoprothiolane fungicide",
            "Drain and re-flood the field to reduce humidity",
        ],
        prevention: &[
            "Avoid excessive nitrogen",
            "Use blast-resistant varieties",
        ],
        symptoms: &[r"\bdiamond\b", r"\bspindle\b", r"\bneck rot\b", r"\bgr[ae]y cent(er|re)\b"],
    },
    DiseaseRecord {
        name: "Bacterial Leaf Blight",
        confidence: 84,
        severity: Severity::High,
        treatments: &[
            "Apply a copper-based bactericide",
            "Remove infected stubble after harvest",
        ],
        prevention: &[
            "Use balanced fertilisation",
            "Keep irrigation channels clean",
        ],
        symptoms: &[r"\byellow(ing)? (stripes?|margins?|edges?)\b", r"\bwilt(ing)?\b", r"\bleaf tips?\b"],
    },
];

static WHEAT: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Stripe Rust",
        confidence: 87,
        severity: Severity::High,
        treatments: &["Apply a triazole fungicide at flag-leaf emergence"],
        prevention: &[
            "Grow resistant cultivars",
            "Remove volunteer wheat",
        ],
        symptoms: &[r"\bstripes?\b", r"\byellow\b", r"\bpowdery\b", r"\brust\b"],
    },
    DiseaseRecord {
        name: "Powdery Mildew",
        confidence: 83,
        severity: Severity::Moderate,
        treatments: &["Apply sulfur or a triazole fungicide"],
        prevention: &[
            "Avoid dense sowing",
            "Limit late nitrogen applications",
        ],
        symptoms: &[r"\bpowder(y)?\b", r"\bwhite\b", r"\bmildew\b"],
    },
];

static PEPPER: &[DiseaseRecord] = &[
    DiseaseRecord {
        name: "Bacterial Leaf Spot",
        confidence: 85,
        severity: Severity::Moderate,
        treatments: &[
            "Spray copper hydroxide combined with mancozeb",
            "Remove heavily spotted leaves",
        ],
        prevention: &[
            "Use pathogen-free seed",
            "Avoid working with wet plants",
        ],
        symptoms: &[r"\bwater[- ]soaked\b", r"\bspots?\b", r"\bleaf drop\b"],
    },
    DiseaseRecord {
        name: "Phytophthora Blight",
        confidence: 81,
        severity: Severity::High,
        treatments: &["Apply mefenoxam to the soil around affected plants"],
        prevention: &[
            "Plant on raised beds with good drainage",
            "Avoid waterlogged soil",
        ],
        symptoms: &[r"\bwilt(ing)?\b", r"\bstem rot\b", r"\bdark (stem|lesions?)\b"],
    },
];

/// 单个作物的条目：记录 + 症状匹配器。
pub(crate) struct CropEntry {
    pub(crate) records: &'static [DiseaseRecord],
    pub(crate) matcher: RegexSet,
    /// `matcher` 中第 i 条模式属于哪条记录。
    pub(crate) pattern_owner: Vec<usize>,
}

impl CropEntry {
    fn new(records: &'static [DiseaseRecord]) -> Result<Self, regex::Error> {
        let mut patterns = Vec::new();
        let mut pattern_owner = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            for pattern in record.symptoms {
                patterns.push(format!("(?i){}", pattern));
                pattern_owner.push(idx);
            }
        }

        Ok(Self {
            records,
            matcher: RegexSet::new(patterns)?,
            pattern_owner,
        })
    }
}

/// 病害目录。
pub struct Catalog {
    entries: BTreeMap<&'static str, CropEntry>,
}

static BUILTIN_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_tables(&[
        ("tomato", TOMATO),
        ("potato", POTATO),
        ("corn", CORN),
        ("rice", RICE),
        ("wheat", WHEAT),
        ("pepper", PEPPER),
    ])
    .expect("内置症状正则编译失败")
});

impl Catalog {
    /// 内置目录。
    pub fn builtin() -> &'static Catalog {
        &BUILTIN_CATALOG
    }

    fn from_tables(
        tables: &[(&'static str, &'static [DiseaseRecord])],
    ) -> Result<Self, regex::Error> {
        let mut entries = BTreeMap::new();
        for (crop, records) in tables {
            entries.insert(*crop, CropEntry::new(*records)?);
        }
        Ok(Self { entries })
    }

    /// 支持的作物（按字母序）。
    pub fn crops(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// 查找作物条目，大小写与首尾空白不敏感。
    pub(crate) fn entry(&self, crop: &str) -> Option<&CropEntry> {
        let key = crop.trim().to_ascii_lowercase();
        self.entries.get(key.as_str())
    }

    /// 作物对应的全部记录；未知作物返回空切片。
    pub fn records(&self, crop: &str) -> &'static [DiseaseRecord] {
        self.entry(crop).map(|entry| entry.records).unwrap_or(&[])
    }

    /// 均匀随机选择一条记录；未知作物返回兜底记录。
    pub fn pick<R: Rng + ?Sized>(&self, crop: &str, rng: &mut R) -> &'static DiseaseRecord {
        match self.records(crop).choose(rng) {
            Some(record) => record,
            None => {
                log::info!("❔ 未知作物 `{}`，使用兜底记录", crop.trim());
                &FALLBACK_RECORD
            }
        }
    }
}
