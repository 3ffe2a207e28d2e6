//! 中文数字转换
//!
//! 把章节名中的中文数字替换为阿拉伯数字，其余字符原样保留：
//! `第一百零三章` → `第103章`。

use phf::phf_map;

static DIGITS: phf::Map<char, u64> = phf_map! {
    '零' => 0, '〇' => 0,
    '一' => 1, '二' => 2, '两' => 2, '三' => 3, '四' => 4,
    '五' => 5, '六' => 6, '七' => 7, '八' => 8, '九' => 9,
};

static UNITS: phf::Map<char, u64> = phf_map! {
    '十' => 10, '百' => 100, '千' => 1000,
};

const TEN_THOUSAND: char = '万';

/// 判断字符是否属于中文数字（数字或单位）
pub fn is_cjk_numeral(c: char) -> bool {
    DIGITS.contains_key(&c) || UNITS.contains_key(&c) || c == TEN_THOUSAND
}

/// 一段连续中文数字的累加状态
#[derive(Default)]
struct NumeralRun {
    /// 万以上的部分
    total: u64,
    /// 万以下已经结算的部分
    section: u64,
    /// 尚未遇到单位的个位数字
    pending: Option<u64>,
    active: bool,
}

impl NumeralRun {
    fn digit(&mut self, value: u64) {
        self.pending = Some(value);
        self.active = true;
    }

    fn unit(&mut self, magnitude: u64) {
        // 单位前没有数字时按 1 处理：十 → 10
        self.section += self.pending.take().unwrap_or(1) * magnitude;
        self.active = true;
    }

    fn ten_thousand(&mut self) {
        let head = self.section + self.pending.take().unwrap_or(0);
        self.total += head.max(1) * 10_000;
        self.section = 0;
        self.active = true;
    }

    /// 结束当前数字段，返回十进制字符串
    fn flush(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }
        let value = self.total + self.section + self.pending.unwrap_or(0);
        *self = Self::default();
        Some(value.to_string())
    }
}

/// 将字符串中的中文数字转换为阿拉伯数字
pub fn normalize(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut run = NumeralRun::default();

    for c in text.chars() {
        if let Some(&value) = DIGITS.get(&c) {
            run.digit(value);
        } else if let Some(&magnitude) = UNITS.get(&c) {
            run.unit(magnitude);
        } else if c == TEN_THOUSAND {
            run.ten_thousand();
        } else {
            if let Some(number) = run.flush() {
                result.push_str(&number);
            }
            result.push(c);
        }
    }

    if let Some(number) = run.flush() {
        result.push_str(&number);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 按标准读法生成 1..=9999 的中文数字
    fn to_cjk(n: u64) -> String {
        const NAMES: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];
        let places = [
            (n / 1000 % 10, Some('千')),
            (n / 100 % 10, Some('百')),
            (n / 10 % 10, Some('十')),
            (n % 10, None),
        ];

        let mut out = String::new();
        let mut gap = false;
        for (i, (digit, unit)) in places.into_iter().enumerate() {
            if digit == 0 {
                gap = !out.is_empty();
                continue;
            }
            if gap {
                out.push('零');
                gap = false;
            }
            // 十几 读作 十X
            if !(i == 2 && digit == 1 && out.is_empty()) {
                out.push(NAMES[digit as usize]);
            }
            if let Some(unit) = unit {
                out.push(unit);
            }
        }
        out
    }

    #[test]
    fn test_known_values() {
        assert_eq!(normalize("十二"), "12");
        assert_eq!(normalize("二十"), "20");
        assert_eq!(normalize("一百零三"), "103");
        assert_eq!(normalize("十"), "10");
        assert_eq!(normalize("九千九百九十九"), "9999");
    }

    #[test]
    fn test_place_value_up_to_9999() {
        for n in 1..=9999 {
            let text = to_cjk(n);
            assert_eq!(normalize(&text), n.to_string(), "input: {}", text);
        }
    }

    #[test]
    fn test_surrounding_text_passes_through() {
        assert_eq!(normalize("第十二章"), "第12章");
        assert_eq!(normalize("第一百零三回"), "第103回");
        assert_eq!(normalize("第12章"), "第12章");
    }

    #[test]
    fn test_ten_thousand_section() {
        assert_eq!(normalize("一万二千"), "12000");
        assert_eq!(normalize("十万"), "100000");
        assert_eq!(normalize("万"), "10000");
    }

    #[test]
    fn test_zero_and_alternate_digits() {
        assert_eq!(normalize("第零章"), "第0章");
        assert_eq!(normalize("两百"), "200");
        assert_eq!(normalize("一百〇五"), "105");
    }

    #[test]
    fn test_is_cjk_numeral() {
        assert!(is_cjk_numeral('十'));
        assert!(is_cjk_numeral('万'));
        assert!(!is_cjk_numeral('章'));
        assert!(!is_cjk_numeral('1'));
    }
}
