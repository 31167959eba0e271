//! # 症状文本匹配
//!
//! ## 设计思路
//!
//! 文本模式没有图片可校验，只能依赖用户描述。每个作物的症状关键词预编译为一个
//! `RegexSet`，一次扫描得到全部命中，按记录统计命中数：
//! - 命中数最高的记录组成候选池
//! - 完全没有命中时，候选池退化为该作物全部记录
//!
//! 最终仍在候选池内均匀随机选择，保持与图片模式一致的“模拟诊断”语义。

use rand::Rng;
use rand::seq::SliceRandom;

use super::catalog::{Catalog, DiseaseRecord, FALLBACK_RECORD};
use super::DiagnosisError;

/// 症状描述的最小长度（字符数，去除首尾空白后）。
pub const MIN_DESCRIPTION_CHARS: usize = 10;

impl Catalog {
    /// 按症状描述筛选候选记录。
    ///
    /// 未知作物返回空列表。
    pub fn symptom_candidates(&self, crop: &str, description: &str) -> Vec<&'static DiseaseRecord> {
        let Some(entry) = self.entry(crop) else {
            return Vec::new();
        };

        let mut hits = vec![0usize; entry.records.len()];
        for pattern_idx in entry.matcher.matches(description).iter() {
            hits[entry.pattern_owner[pattern_idx]] += 1;
        }

        let best = hits.iter().copied().max().unwrap_or(0);
        if best == 0 {
            return entry.records.iter().collect();
        }

        log::debug!("🔎 症状匹配 - crop={} best_hits={}", crop.trim(), best);

        entry
            .records
            .iter()
            .zip(hits)
            .filter(|(_, count)| *count == best)
            .map(|(record, _)| record)
            .collect()
    }

    /// 文本模式诊断。
    pub fn diagnose_text<R: Rng + ?Sized>(
        &self,
        crop: &str,
        description: &str,
        rng: &mut R,
    ) -> Result<&'static DiseaseRecord, DiagnosisError> {
        let description = description.trim();
        let chars = description.chars().count();
        if chars < MIN_DESCRIPTION_CHARS {
            return Err(DiagnosisError::DescriptionTooShort {
                actual: chars,
                min: MIN_DESCRIPTION_CHARS,
            });
        }

        let candidates = self.symptom_candidates(crop, description);
        Ok(candidates.choose(rng).copied().unwrap_or(&FALLBACK_RECORD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn keyword_hits_narrow_the_pool() {
        let candidates = Catalog::builtin().symptom_candidates(
            "corn",
            "Small orange pustules all over the leaves, looks rusty",
        );

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Common Rust");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let candidates =
            Catalog::builtin().symptom_candidates("tomato", "CONCENTRIC rings like a TARGET");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Early Blight");
    }

    #[test]
    fn no_hits_falls_back_to_whole_crop() {
        let candidates =
            Catalog::builtin().symptom_candidates("rice", "the plants just look unhappy today");

        assert_eq!(candidates.len(), Catalog::builtin().records("rice").len());
    }

    #[test]
    fn unknown_crop_yields_fallback_record() {
        let mut rng = StdRng::seed_from_u64(1);
        let record = Catalog::builtin()
            .diagnose_text("cactus", "spines are turning brown at the tips", &mut rng)
            .expect("diagnose text failed");

        assert_eq!(record.name, FALLBACK_RECORD.name);
    }

    #[test]
    fn short_description_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = Catalog::builtin().diagnose_text("tomato", "   spots   ", &mut rng);

        assert!(matches!(
            result,
            Err(DiagnosisError::DescriptionTooShort { actual: 5, min: 10 })
        ));
    }

    #[test]
    fn diagnose_text_picks_from_matched_pool() {
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let record = Catalog::builtin()
                .diagnose_text("wheat", "white powdery mildew on the leaves", &mut rng)
                .expect("diagnose text failed");
            assert_eq!(record.name, "Powdery Mildew");
        }
    }
}
