//! Scripted dialogs. Текст показывает host; ядро только ставит паузу и ждёт
//! `DialogFinished`.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLine {
    pub speaker: &'static str,
    pub text: &'static str,
}

const fn line(speaker: &'static str, text: &'static str) -> DialogLine {
    DialogLine { speaker, text }
}

const INTRO: &[DialogLine] = &[
    line("主人公", "……ここは、霧の森か。"),
    line("主人公", "気配を感じる。奴らが潜んでいるようだ。"),
    line(
        "システム",
        "【操作方法】\n← → ： 移動\nSpace ： 攻撃\n↑ ： ジャンプ\n↓ ： 防御（直前でパリィ）",
    ),
    line("主人公", "……行くぞ。"),
];

const INTERSTITIAL: &[DialogLine] = &[
    line("主人公", "……片付いたか。"),
    line("主人公", "いや、霧が濃くなっていく。まだ何かいる。"),
];

const BOSS_INTRO: &[DialogLine] = &[
    line("？？？", "我が手下を斬ったのは貴様か。"),
    line("主人公", "霧の主か。……ここで断つ。"),
];

const OUTRO: &[DialogLine] = &[
    line("主人公", "……霧が晴れていく。"),
    line("主人公", "終わった。"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum DialogScript {
    Intro,
    Interstitial,
    BossIntro,
    Outro,
}

impl DialogScript {
    pub fn lines(&self) -> &'static [DialogLine] {
        match self {
            DialogScript::Intro => INTRO,
            DialogScript::Interstitial => INTERSTITIAL,
            DialogScript::BossIntro => BOSS_INTRO,
            DialogScript::Outro => OUTRO,
        }
    }
}
