use std::collections::BTreeSet;

/// Common spending words so compounds like "ค่าอาหาร" split before the corpus
/// has seen their parts.
const SEED_LEXICON: &[&str] = &[
    "ค่า", "ข้าว", "อาหาร", "เช้า", "กลางวัน", "เย็น", "กาแฟ", "น้ำ", "ไฟ", "รถ", "เมล์",
    "แท็กซี่", "น้ำมัน", "ทางด่วน", "บ้าน", "เช่า", "ห้อง", "โทรศัพท์", "เน็ต", "เงินเดือน",
    "โบนัส", "หวย", "ขนม", "ตลาด", "ยา", "หมอ", "เสื้อ", "ผ้า", "ของ", "ใช้", "ซื้อ", "ร้าน",
    "ประกัน", "ภาษี", "ดอกเบี้ย", "โอน", "เงิน", "ทำบุญ", "หนัง", "เกม", "ชา", "นม",
];

const MAX_WORD_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// Scripts written without spaces between words.
    Unspaced,
    Word,
    Separator,
}

fn classify(c: char) -> CharClass {
    match c as u32 {
        // Thai, Lao, Myanmar, Khmer
        0x0E00..=0x0EFF | 0x1000..=0x109F | 0x1780..=0x17FF => CharClass::Unspaced,
        // CJK ideographs, kana
        0x3040..=0x30FF | 0x3400..=0x4DBF | 0x4E00..=0x9FFF => CharClass::Unspaced,
        _ if c.is_alphanumeric() => CharClass::Word,
        _ => CharClass::Separator,
    }
}

/// Dictionary-driven word segmentation. Spaced scripts split on separators;
/// unspaced runs are cut by longest dictionary match, with unknown stretches
/// kept whole. Unspaced runs also yield character bigrams.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    lexicon: BTreeSet<String>,
}

impl Segmenter {
    pub fn with_seed_lexicon() -> Self {
        Self {
            lexicon: SEED_LEXICON.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Seed lexicon plus every unspaced run found in `texts`.
    pub fn from_corpus<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seg = Self::with_seed_lexicon();
        for text in texts {
            for (class, run) in runs(&text.to_lowercase()) {
                let len = run.chars().count();
                if class == CharClass::Unspaced && len > 1 && len <= MAX_WORD_CHARS {
                    seg.lexicon.insert(run);
                }
            }
        }
        seg
    }

    pub fn from_lexicon(words: Vec<String>) -> Self {
        Self {
            lexicon: words.into_iter().collect(),
        }
    }

    pub fn lexicon(&self) -> Vec<String> {
        self.lexicon.iter().cloned().collect()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for (class, run) in runs(&text.to_lowercase()) {
            match class {
                CharClass::Word => tokens.push(run),
                CharClass::Unspaced => {
                    let chars: Vec<char> = run.chars().collect();
                    tokens.extend(self.maximal_match(&chars));
                    tokens.extend(bigrams(&chars));
                }
                CharClass::Separator => {}
            }
        }
        tokens
    }

    fn longest_word_at(&self, chars: &[char], start: usize) -> Option<usize> {
        let max = (chars.len() - start).min(MAX_WORD_CHARS);
        (2..=max)
            .rev()
            .find(|&len| {
                let candidate: String = chars[start..start + len].iter().collect();
                self.lexicon.contains(&candidate)
            })
    }

    fn maximal_match(&self, chars: &[char]) -> Vec<String> {
        let mut words = Vec::new();
        let mut unknown = String::new();
        let mut i = 0;
        while i < chars.len() {
            match self.longest_word_at(chars, i) {
                Some(len) => {
                    if !unknown.is_empty() {
                        words.push(std::mem::take(&mut unknown));
                    }
                    words.push(chars[i..i + len].iter().collect());
                    i += len;
                }
                None => {
                    unknown.push(chars[i]);
                    i += 1;
                }
            }
        }
        if !unknown.is_empty() {
            words.push(unknown);
        }
        words
    }
}

fn runs(text: &str) -> Vec<(CharClass, String)> {
    let mut out: Vec<(CharClass, String)> = Vec::new();
    for c in text.chars() {
        let class = classify(c);
        match out.last_mut() {
            Some((last, run)) if *last == class => run.push(c),
            _ => out.push((class, c.to_string())),
        }
    }
    out.retain(|(class, _)| *class != CharClass::Separator);
    out
}

fn bigrams(chars: &[char]) -> Vec<String> {
    chars
        .windows(2)
        .map(|w| format!("#{}{}", w[0], w[1]))
        .collect()
}
