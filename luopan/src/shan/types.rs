//! Named sectors, trigrams and elements of the 24-mountain ring.

use std::fmt;

use serde::Serialize;

/// Number of shan sectors on the ring.
pub const SHAN_COUNT: usize = 24;

/// Angular width of one shan sector in degrees.
pub const SHAN_WIDTH_DEG: f64 = 15.0;

/// One of the 24 mountains (二十四山), in clockwise order from due north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Shan {
    Zi,
    Gui,
    Chou,
    Gen,
    Yin,
    Jia,
    Mao,
    Yi,
    Chen,
    Xun,
    Si,
    Bing,
    Wu,
    Ding,
    Wei,
    Kun,
    Shen,
    Geng,
    You,
    Xin,
    Xu,
    Qian,
    Hai,
    Ren,
}

impl Shan {
    /// All sectors in ring order; `Shan::ALL[i]` is sector `i`.
    pub const ALL: [Shan; SHAN_COUNT] = [
        Shan::Zi,
        Shan::Gui,
        Shan::Chou,
        Shan::Gen,
        Shan::Yin,
        Shan::Jia,
        Shan::Mao,
        Shan::Yi,
        Shan::Chen,
        Shan::Xun,
        Shan::Si,
        Shan::Bing,
        Shan::Wu,
        Shan::Ding,
        Shan::Wei,
        Shan::Kun,
        Shan::Shen,
        Shan::Geng,
        Shan::You,
        Shan::Xin,
        Shan::Xu,
        Shan::Qian,
        Shan::Hai,
        Shan::Ren,
    ];

    /// Position of this sector on the ring (0 = 子, due north).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Chinese glyph.
    pub fn glyph(self) -> &'static str {
        const GLYPHS: [&str; SHAN_COUNT] = [
            "子", "癸", "丑", "艮", "寅", "甲", "卯", "乙", "辰", "巽", "巳", "丙", "午", "丁",
            "未", "坤", "申", "庚", "酉", "辛", "戌", "乾", "亥", "壬",
        ];
        GLYPHS[self.index()]
    }

    /// Pinyin romanization.
    pub fn pinyin(self) -> &'static str {
        const PINYIN: [&str; SHAN_COUNT] = [
            "zi", "gui", "chou", "gen", "yin", "jia", "mao", "yi", "chen", "xun", "si", "bing",
            "wu", "ding", "wei", "kun", "shen", "geng", "you", "xin", "xu", "qian", "hai", "ren",
        ];
        PINYIN[self.index()]
    }

    /// Five-element group of this sector.
    pub fn element(self) -> Element {
        use Element::*;
        // 正五行: the four "storehouse" branches and 艮/坤 are earth,
        // 巽 joins wood and 乾 joins metal.
        const ELEMENTS: [Element; SHAN_COUNT] = [
            Water, Water, Earth, Earth, Wood, Wood, Wood, Wood, Earth, Wood, Fire, Fire, Fire,
            Fire, Earth, Earth, Metal, Metal, Metal, Metal, Earth, Metal, Water, Water,
        ];
        ELEMENTS[self.index()]
    }

    /// Trigram group of this sector (three consecutive sectors per trigram).
    pub fn trigram(self) -> Trigram {
        Trigram::ALL[self.index() / 3]
    }
}

impl fmt::Display for Shan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// One of the eight trigrams (八卦), in ring order from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Trigram {
    Kan,
    Gen,
    Zhen,
    Xun,
    Li,
    Kun,
    Dui,
    Qian,
}

impl Trigram {
    pub const ALL: [Trigram; 8] = [
        Trigram::Kan,
        Trigram::Gen,
        Trigram::Zhen,
        Trigram::Xun,
        Trigram::Li,
        Trigram::Kun,
        Trigram::Dui,
        Trigram::Qian,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Trigram::Kan => "坎",
            Trigram::Gen => "艮",
            Trigram::Zhen => "震",
            Trigram::Xun => "巽",
            Trigram::Li => "离",
            Trigram::Kun => "坤",
            Trigram::Dui => "兑",
            Trigram::Qian => "乾",
        }
    }

    /// Unicode trigram symbol (☰ … ☷).
    pub fn symbol(self) -> char {
        match self {
            Trigram::Kan => '☵',
            Trigram::Gen => '☶',
            Trigram::Zhen => '☳',
            Trigram::Xun => '☴',
            Trigram::Li => '☲',
            Trigram::Kun => '☷',
            Trigram::Dui => '☱',
            Trigram::Qian => '☰',
        }
    }

    /// Compass direction the trigram governs in the later-heaven arrangement.
    pub fn direction(self) -> &'static str {
        match self {
            Trigram::Kan => "N",
            Trigram::Gen => "NE",
            Trigram::Zhen => "E",
            Trigram::Xun => "SE",
            Trigram::Li => "S",
            Trigram::Kun => "SW",
            Trigram::Dui => "W",
            Trigram::Qian => "NW",
        }
    }

    /// The three sectors of this trigram, in ring order.
    pub fn sectors(self) -> [Shan; 3] {
        let first = self.index() * 3;
        [Shan::ALL[first], Shan::ALL[first + 1], Shan::ALL[first + 2]]
    }
}

impl fmt::Display for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol(), self.glyph())
    }
}

/// One of the five elements (五行).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// Sectors belonging to this element, in ring order.
    pub fn sectors(self) -> Vec<Shan> {
        Shan::ALL
            .iter()
            .copied()
            .filter(|shan| shan.element() == self)
            .collect()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Classification of a bearing on the 24-mountain ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShanInfo {
    pub shan: Shan,
    pub element: Element,
    pub trigram: Trigram,
    /// Start of the sector in degrees, normalized (子 starts at 352.5).
    pub sector_start_degree: f64,
    /// Sector index, `0..24`.
    pub index: usize,
}

impl ShanInfo {
    /// Build the info for sector `index` (taken modulo 24).
    pub fn for_index(index: usize) -> Self {
        let index = index % SHAN_COUNT;
        let shan = Shan::ALL[index];
        Self {
            shan,
            element: shan.element(),
            trigram: shan.trigram(),
            sector_start_degree: crate::geo::angle::normalize(
                index as f64 * SHAN_WIDTH_DEG - SHAN_WIDTH_DEG / 2.0,
            ),
            index,
        }
    }

    /// Centre line of the sector in degrees.
    pub fn center_degree(&self) -> f64 {
        self.index as f64 * SHAN_WIDTH_DEG
    }

    /// End of the sector in degrees (exclusive), normalized.
    pub fn sector_end_degree(&self) -> f64 {
        crate::geo::angle::normalize(self.sector_start_degree + SHAN_WIDTH_DEG)
    }
}

impl fmt::Display for ShanInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} {}",
            self.shan,
            self.shan.pinyin(),
            self.trigram,
            self.element
        )
    }
}
