//! City-name canonicalization: the rename table, the suffix exemptions and
//! the default rule that appends the city-level suffix.
//!
//! The tables are plain data carried by [`NamingPolicy`]. Callers inject a
//! policy; nothing in the engines reads a global table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default city-level suffix of the native naming convention.
pub const CITY_SUFFIX: char = '市';

const RENAMES: &[(&str, &str)] = &[("大兴安岭", "大兴安岭地区")];

/// Units that never take the city suffix: autonomous prefectures, leagues,
/// prefectures, new areas, forestry districts, corps divisions, and the
/// districts of the four municipalities.
const EXEMPT: &[&str] = &[
    // Leagues, prefectures and autonomous prefectures
    "锡林郭勒盟", "阿拉善盟", "兴安盟",
    "甘孜州", "凉山州", "阿坝州",
    "德宏州", "红河州", "大理州", "文山州", "楚雄州", "西双版纳州", "怒江州", "迪庆州",
    "恩施州", "湘西州", "延边州",
    "黔南州", "黔东南州", "黔西南州",
    "海北州", "海西州", "海南州", "黄南州", "果洛州", "玉树州",
    "临夏州", "甘南州",
    "伊犁州", "昌吉州", "博州", "克州", "巴州（巴音郭楞蒙古自治州）",
    "喀什地区", "阿克苏地区", "和田地区", "塔城地区", "阿勒泰地区",
    "大兴安岭地区", "日喀则地区", "阿里地区",
    // New areas and forestry districts
    "赣江新区", "雄安新区", "两江新区", "神农架林区",
    // Production and construction corps divisions
    "兵团第四师", "兵团第七师", "兵团第八师", "兵团第九师", "兵团第十二师",
    // Beijing
    "东城区", "西城区", "朝阳区", "丰台区", "石景山区", "海淀区", "门头沟区", "房山区",
    "通州区", "顺义区", "昌平区", "大兴区", "怀柔区", "平谷区", "密云区", "延庆区",
    // Shanghai
    "黄浦区", "徐汇区", "长宁区", "静安区", "普陀区", "虹口区", "杨浦区", "闵行区",
    "宝山区", "嘉定区", "浦东新区", "金山区", "松江区", "青浦区", "奉贤区", "崇明区",
    // Tianjin
    "和平区", "河东区", "河西区", "南开区", "河北区", "红桥区", "东丽区", "西青区",
    "津南区", "北辰区", "武清区", "宝坻区", "滨海新区", "宁河区", "静海区", "蓟州区",
    // Chongqing
    "渝中区", "江北区", "沙坪坝区", "九龙坡区", "南岸区", "北碚区", "渝北区", "巴南区",
    "大渡口区", "万州区", "涪陵区", "黔江区", "长寿区", "永川区", "合川区", "江津区",
    "綦江区", "大足区", "璧山区", "铜梁区", "潼南区", "荣昌区", "开州区", "梁平区",
    "武隆区", "石柱县", "秀山县", "酉阳县", "彭水县", "垫江县", "忠县", "云阳县",
    "奉节县", "巫山县", "巫溪县", "城口县", "丰都县", "南川区", "万盛经开区", "高新区",
];

/// Bookkeeping rows that appear among a province's cities but are not places.
const PLACEHOLDER_CITIES: &[&str] = &[
    "待明确地区", "境外输入", "境外输入人员", "外地来京人员", "外地来沪人员",
    "外地来津人员", "外地来渝人员", "外地来穗人员", "省十里丰监狱",
];

/// Provinces reported without a city breakdown.
const CITYLESS_PROVINCES: &[&str] = &["香港", "澳门", "台湾"];

/// Rename, exemption and suffix tables used when turning raw city names
/// into display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingPolicy {
    pub renames: BTreeMap<String, String>,
    pub exempt: BTreeSet<String>,
    pub suffix: char,
    pub placeholder_cities: BTreeSet<String>,
    pub cityless_provinces: BTreeSet<String>,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            renames: RENAMES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            exempt: EXEMPT.iter().map(|s| s.to_string()).collect(),
            suffix: CITY_SUFFIX,
            placeholder_cities: PLACEHOLDER_CITIES.iter().map(|s| s.to_string()).collect(),
            cityless_provinces: CITYLESS_PROVINCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A table entry on which `canonicalize` is not idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotenceViolation {
    pub entry: String,
    pub once: String,
    pub twice: String,
}

impl NamingPolicy {
    /// Rename first, then append the suffix unless the name is exempt,
    /// already suffixed, or is itself a rename target.
    pub fn canonicalize(&self, raw: &str) -> String {
        let name = self.renames.get(raw).map(String::as_str).unwrap_or(raw);
        if self.is_final(name) {
            name.to_string()
        } else {
            let mut out = String::with_capacity(name.len() + self.suffix.len_utf8());
            out.push_str(name);
            out.push(self.suffix);
            out
        }
    }

    fn is_final(&self, name: &str) -> bool {
        name.is_empty()
            || name.ends_with(self.suffix)
            || self.exempt.contains(name)
            || self.renames.values().any(|target| target == name)
    }

    pub fn is_exempt(&self, name: &str) -> bool {
        self.exempt.contains(name)
    }

    pub fn is_placeholder_city(&self, name: &str) -> bool {
        self.placeholder_cities.contains(name)
    }

    pub fn is_cityless_province(&self, short_name: &str) -> bool {
        self.cityless_provinces.contains(short_name)
    }

    /// Check every table entry for `canonicalize(canonicalize(x)) == canonicalize(x)`.
    ///
    /// Custom tables can break this, most often with chained renames
    /// (`a -> b`, `b -> c`). The built-in tables audit clean.
    pub fn audit(&self) -> Vec<IdempotenceViolation> {
        let entries = self
            .exempt
            .iter()
            .chain(self.renames.keys())
            .chain(self.renames.values());

        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for entry in entries {
            if !seen.insert(entry.as_str()) {
                continue;
            }
            let once = self.canonicalize(entry);
            let twice = self.canonicalize(&once);
            if once != twice {
                out.push(IdempotenceViolation {
                    entry: entry.clone(),
                    once,
                    twice,
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_gets_suffix() {
        let policy = NamingPolicy::default();
        assert_eq!(policy.canonicalize("武汉"), "武汉市");
        assert_eq!(policy.canonicalize("武汉").chars().count(), "武汉".chars().count() + 1);
    }

    #[test]
    fn test_exempt_name_unchanged() {
        let policy = NamingPolicy::default();
        assert_eq!(policy.canonicalize("杨浦区"), "杨浦区");
        assert_eq!(policy.canonicalize("恩施州"), "恩施州");
        assert_eq!(policy.canonicalize("巴州（巴音郭楞蒙古自治州）"), "巴州（巴音郭楞蒙古自治州）");
    }

    #[test]
    fn test_chongqing_economic_zones_exempt() {
        let p = NamingPolicy::default();
        for name in ["万盛经开区", "高新区", "南川区", "两江新区"] {
            assert_eq!(p.canonicalize(name), name);
        }
    }

    #[test]
    fn test_rename_applied_first() {
        let policy = NamingPolicy::default();
        assert_eq!(policy.canonicalize("大兴安岭"), "大兴安岭地区");
    }

    #[test]
    fn test_already_suffixed_unchanged() {
        let policy = NamingPolicy::default();
        assert_eq!(policy.canonicalize("武汉市"), "武汉市");
    }

    #[test]
    fn test_idempotent_across_full_table() {
        let policy = NamingPolicy::default();
        assert!(policy.audit().is_empty(), "violations: {:?}", policy.audit());

        for name in EXEMPT.iter().chain(["武汉", "广州", "大兴安岭", ""].iter()) {
            let once = policy.canonicalize(name);
            assert_eq!(policy.canonicalize(&once), once, "not idempotent for {}", name);
        }
    }

    #[test]
    fn test_audit_flags_chained_renames() {
        let mut policy = NamingPolicy::default();
        policy.renames.insert("甲".into(), "乙".into());
        policy.renames.insert("乙".into(), "丙".into());

        let violations = policy.audit();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].entry, "甲");
        assert_eq!(violations[0].once, "乙");
        assert_eq!(violations[0].twice, "丙");
    }

    #[test]
    fn test_custom_suffix() {
        let policy = NamingPolicy {
            suffix: '县',
            ..NamingPolicy::default()
        };
        assert_eq!(policy.canonicalize("某地"), "某地县");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let policy: NamingPolicy = serde_json::from_str(r#"{"suffix": "市"}"#).unwrap();
        assert!(policy.is_exempt("阿拉善盟"));
        assert!(policy.is_placeholder_city("境外输入"));
        assert!(policy.is_cityless_province("香港"));
    }
}
