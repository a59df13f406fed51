// Hunspell `.aff` / `.dic` reading: charset decoding and affix expansion.
//
// Only what is needed to list the word forms of a dictionary is supported:
// PFX/SFX classes with cross products, FLAG formats and NEEDAFFIX. Twofold
// suffixes (continuation classes on an affix) and compounding are ignored.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;

/// Text encodings declared with `SET` that Russian dictionaries use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Koi8R,
    Cp1251,
}

// KOI8-R 0xC0..=0xDF; 0xE0..=0xFF are the same letters in upper case.
const KOI8_R_LETTERS: [char; 32] = [
    'ю', 'а', 'б', 'ц', 'д', 'е', 'ф', 'г', 'х', 'и', 'й', 'к', 'л', 'м', 'н', 'о', 'п', 'я',
    'р', 'с', 'т', 'у', 'ж', 'в', 'ь', 'ы', 'з', 'ш', 'э', 'щ', 'ч', 'ъ',
];

impl Charset {
    /// Read the `SET` directive of an affix file; UTF-8 when there is none.
    pub fn detect(aff: &[u8]) -> Result<Self> {
        let header = String::from_utf8_lossy(aff);
        let declared = header.lines().find_map(|line| {
            let mut tokens = line.split_whitespace();
            (tokens.next() == Some("SET")).then(|| tokens.next().unwrap_or(""))
        });

        match declared.map(|s| s.to_ascii_uppercase()).as_deref() {
            None | Some("UTF-8") => Ok(Charset::Utf8),
            Some("KOI8-R") => Ok(Charset::Koi8R),
            Some("CP1251") | Some("WINDOWS-1251") | Some("MICROSOFT-CP1251") => {
                Ok(Charset::Cp1251)
            }
            Some(other) => bail!("Unsupported dictionary encoding: {}", other),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Koi8R => bytes.iter().map(|&b| koi8_r(b)).collect(),
            Charset::Cp1251 => bytes.iter().map(|&b| cp1251(b)).collect(),
        }
    }
}

fn koi8_r(byte: u8) -> char {
    match byte {
        0x00..=0x7F => byte as char,
        0xA3 => 'ё',
        0xB3 => 'Ё',
        0xC0..=0xDF => KOI8_R_LETTERS[(byte - 0xC0) as usize],
        0xE0..=0xFF => {
            let lower = KOI8_R_LETTERS[(byte - 0xE0) as usize];
            lower.to_uppercase().next().unwrap_or(lower)
        }
        _ => char::REPLACEMENT_CHARACTER,
    }
}

fn cp1251(byte: u8) -> char {
    match byte {
        0x00..=0x7F => byte as char,
        0xA8 => 'Ё',
        0xB8 => 'ё',
        0xC0..=0xFF => char::from_u32(0x0410 + u32::from(byte - 0xC0))
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        _ => char::REPLACEMENT_CHARACTER,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagMode {
    Char,
    Long,
    Num,
}

impl FlagMode {
    fn split(self, raw: &str) -> Vec<String> {
        match self {
            FlagMode::Char => raw.chars().map(String::from).collect(),
            FlagMode::Long => {
                let chars: Vec<char> = raw.chars().collect();
                chars.chunks(2).map(|pair| pair.iter().collect()).collect()
            }
            FlagMode::Num => raw
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CondChar {
    Any,
    Is(char),
    OneOf(Vec<char>),
    NoneOf(Vec<char>),
}

impl CondChar {
    fn matches(&self, c: char) -> bool {
        match self {
            CondChar::Any => true,
            CondChar::Is(expected) => c == *expected,
            CondChar::OneOf(set) => set.contains(&c),
            CondChar::NoneOf(set) => !set.contains(&c),
        }
    }
}

fn parse_condition(condition: &str) -> Result<Vec<CondChar>> {
    let mut parsed = Vec::new();
    let mut chars = condition.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => parsed.push(CondChar::Any),
            '[' => {
                let mut set = Vec::new();
                let mut negated = false;
                let mut closed = false;
                for (i, c) in chars.by_ref().enumerate() {
                    match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '^' if i == 0 => negated = true,
                        c => set.push(c),
                    }
                }
                if !closed {
                    bail!("Unclosed '[' in affix condition '{}'", condition);
                }
                parsed.push(if negated {
                    CondChar::NoneOf(set)
                } else {
                    CondChar::OneOf(set)
                });
            }
            c => parsed.push(CondChar::Is(c)),
        }
    }

    Ok(parsed)
}

fn matches_all(condition: &[CondChar], chars: impl Iterator<Item = char>) -> bool {
    let mut matched = 0;
    for (cond, c) in condition.iter().zip(chars) {
        if !cond.matches(c) {
            return false;
        }
        matched += 1;
    }
    matched == condition.len()
}

#[derive(Debug, Clone)]
struct AffixEntry {
    strip: String,
    add: String,
    condition: Vec<CondChar>,
}

impl AffixEntry {
    fn suffix(&self, word: &str) -> Option<String> {
        let base = word.strip_suffix(self.strip.as_str())?;
        let reversed: Vec<CondChar> = self.condition.iter().rev().cloned().collect();
        matches_all(&reversed, word.chars().rev()).then(|| format!("{}{}", base, self.add))
    }

    fn prefix(&self, word: &str) -> Option<String> {
        let rest = word.strip_prefix(self.strip.as_str())?;
        matches_all(&self.condition, word.chars()).then(|| format!("{}{}", self.add, rest))
    }
}

#[derive(Debug, Clone, Default)]
struct AffixClass {
    cross_product: bool,
    entries: Vec<AffixEntry>,
}

/// Affix rules of one `.aff` file.
#[derive(Debug, Clone)]
pub struct Affixes {
    flag_mode: FlagMode,
    need_affix: Option<String>,
    prefixes: HashMap<String, AffixClass>,
    suffixes: HashMap<String, AffixClass>,
}

impl Affixes {
    pub fn parse(aff: &str) -> Result<Self> {
        let mut affixes = Self {
            flag_mode: FlagMode::Char,
            need_affix: None,
            prefixes: HashMap::new(),
            suffixes: HashMap::new(),
        };

        for (number, line) in aff.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["FLAG", mode, ..] => {
                    affixes.flag_mode = match *mode {
                        "long" => FlagMode::Long,
                        "num" => FlagMode::Num,
                        _ => FlagMode::Char,
                    }
                }
                ["NEEDAFFIX", flag, ..] => affixes.need_affix = Some(flag.to_string()),
                [kind @ ("PFX" | "SFX"), flag, rest @ ..] => {
                    let classes = if *kind == "PFX" {
                        &mut affixes.prefixes
                    } else {
                        &mut affixes.suffixes
                    };
                    let class = classes.entry(flag.to_string()).or_default();

                    match rest {
                        [cross @ ("Y" | "N"), count] if count.parse::<usize>().is_ok() => {
                            class.cross_product = *cross == "Y";
                        }
                        [strip, add, condition @ ..] => {
                            let condition = condition.first().copied().unwrap_or(".");
                            class.entries.push(AffixEntry {
                                strip: empty_if_zero(strip).to_string(),
                                add: empty_if_zero(add.split('/').next().unwrap_or(""))
                                    .to_string(),
                                condition: parse_condition(condition).with_context(|| {
                                    format!("Bad affix rule on line {}", number + 1)
                                })?,
                            });
                        }
                        _ => log::debug!("Skipping affix line {}: {}", number + 1, line),
                    }
                }
                _ => {}
            }
        }

        Ok(affixes)
    }

    /// Every word form a stem with `flags` produces, the stem included
    /// unless it is marked NEEDAFFIX.
    pub fn expand(&self, stem: &str, flags: &str) -> Vec<String> {
        let flags = self.flag_mode.split(flags);
        let mut forms = Vec::new();

        if !self
            .need_affix
            .as_ref()
            .is_some_and(|need| flags.contains(need))
        {
            forms.push(stem.to_string());
        }

        let mut suffixed: Vec<(String, bool)> = Vec::new();
        for class in flags.iter().filter_map(|f| self.suffixes.get(f)) {
            for entry in &class.entries {
                if let Some(form) = entry.suffix(stem) {
                    suffixed.push((form, class.cross_product));
                }
            }
        }

        for class in flags.iter().filter_map(|f| self.prefixes.get(f)) {
            for entry in &class.entries {
                forms.extend(entry.prefix(stem));
                if !class.cross_product {
                    continue;
                }
                for (form, cross) in &suffixed {
                    if *cross {
                        forms.extend(entry.prefix(form));
                    }
                }
            }
        }

        forms.extend(suffixed.into_iter().map(|(form, _)| form));
        forms
    }

    /// Expand a `.dic` file: the entry count line is skipped, and anything
    /// after the first whitespace on a line (morphology) is ignored.
    pub fn expand_dic(&self, dic: &str) -> Vec<String> {
        dic.lines()
            .filter_map(|line| line.split_whitespace().next())
            .filter(|entry| !entry.chars().all(|c| c.is_ascii_digit()))
            .flat_map(|entry| match entry.split_once('/') {
                Some((stem, flags)) => self.expand(stem, flags),
                None => vec![entry.to_string()],
            })
            .filter(|word| !word.is_empty() && !word.contains(char::REPLACEMENT_CHARACTER))
            .map(|word| word.to_lowercase())
            .collect()
    }
}

fn empty_if_zero(field: &str) -> &str {
    if field == "0" {
        ""
    } else {
        field
    }
}

/// All word forms of a hunspell dictionary given its raw `.aff` and `.dic`.
pub fn hunspell_words(aff: &[u8], dic: &[u8]) -> Result<Vec<String>> {
    let charset = Charset::detect(aff)?;
    let affixes = Affixes::parse(&charset.decode(aff))?;
    let words = affixes.expand_dic(&charset.decode(dic));
    log::debug!("Expanded hunspell dictionary ({:?}) to {} forms", charset, words.len());
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AFF: &str = "SET UTF-8\n\
        \n\
        # verbs\n\
        SFX A Y 2\n\
        SFX A ть ли ть\n\
        SFX A ть л ть\n\
        \n\
        SFX B Y 1\n\
        SFX B 0 ы [^аеиоуя]\n\
        \n\
        PFX P Y 1\n\
        PFX P 0 не .\n";

    fn forms(stem: &str, flags: &str) -> Vec<String> {
        let mut forms = Affixes::parse(AFF).unwrap().expand(stem, flags);
        forms.sort();
        forms
    }

    #[test]
    fn test_suffix_expansion() {
        assert_eq!(forms("запустить", "A"), vec!["запустил", "запустили", "запустить"]);
    }

    #[test]
    fn test_condition_limits_suffix() {
        assert_eq!(forms("кот", "B"), vec!["кот", "коты"]);
        assert_eq!(forms("мама", "B"), vec!["мама"]);
    }

    #[test]
    fn test_cross_product() {
        assert_eq!(
            forms("кот", "BP"),
            vec!["кот", "коты", "некот", "некоты"]
        );
    }

    #[test]
    fn test_need_affix_and_long_flags() {
        let aff = "FLAG long\nNEEDAFFIX zz\nSFX Aa Y 1\nSFX Aa 0 а .\n";
        let affixes = Affixes::parse(aff).unwrap();
        assert_eq!(affixes.expand("стол", "Aazz"), vec!["стола"]);
    }

    #[test]
    fn test_expand_dic() {
        let affixes = Affixes::parse(AFF).unwrap();
        let mut words = affixes.expand_dic("3\nЗапустить/A\tpo:verb\nдом\n");
        words.sort();
        assert_eq!(words, vec!["дом", "запустил", "запустили", "запустить"]);
    }

    #[test]
    fn test_charsets() {
        assert_eq!(Charset::detect(b"SET KOI8-R\n").unwrap(), Charset::Koi8R);
        assert_eq!(Charset::detect(b"TRY abc\n").unwrap(), Charset::Utf8);
        assert!(Charset::detect(b"SET ISO8859-5\n").is_err());

        assert_eq!(Charset::Koi8R.decode(&[0xCB, 0xCF, 0xD4, 0xA3]), "котё");
        assert_eq!(Charset::Koi8R.decode(&[0xEB, 0xCF, 0xD4]), "Кот");
        assert_eq!(Charset::Cp1251.decode(&[0xEA, 0xEE, 0xF2, 0xA8]), "котЁ");
    }

    #[test]
    fn test_hunspell_words_koi8() {
        // "кот/B" in KOI8-R
        let dic = [b'1', b'\n', 0xCB, 0xCF, 0xD4, b'/', b'B', b'\n'];
        let aff = b"SET KOI8-R\nSFX B Y 1\nSFX B 0 \xD9 .\n";

        let mut words = hunspell_words(aff, &dic).unwrap();
        words.sort();
        assert_eq!(words, vec!["кот", "коты"]);
    }
}
