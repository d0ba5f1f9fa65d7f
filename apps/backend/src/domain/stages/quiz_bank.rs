//! Built-in question and track banks.

use crate::domain::stages::quiz::Difficulty;

pub struct BankEntry {
    pub id: &'static str,
    pub prompt: &'static str,
    pub choices: [&'static str; 4],
    pub answer: u8,
    pub difficulty: Difficulty,
}

macro_rules! entry {
    ($id:expr, $prompt:expr, [$a:expr, $b:expr, $c:expr, $d:expr], $answer:expr, $diff:ident) => {
        BankEntry {
            id: $id,
            prompt: $prompt,
            choices: [$a, $b, $c, $d],
            answer: $answer,
            difficulty: Difficulty::$diff,
        }
    };
}

pub static TRIVIA: &[BankEntry] = &[
    entry!("t01", "How many dice are rolled in Yatzy?", ["4", "5", "6", "7"], 1, Easy),
    entry!("t02", "Which planet is known as the red planet?", ["Venus", "Jupiter", "Mars", "Mercury"], 2, Easy),
    entry!("t03", "How many cards are in a standard deck without jokers?", ["48", "50", "52", "54"], 2, Easy),
    entry!("t04", "What is the capital of Norway?", ["Bergen", "Oslo", "Trondheim", "Stavanger"], 1, Easy),
    entry!("t05", "Which element has the chemical symbol Fe?", ["Iron", "Lead", "Tin", "Fluorine"], 0, Easy),
    entry!("t06", "How many pockets does a European roulette wheel have?", ["36", "37", "38", "40"], 1, Medium),
    entry!("t07", "In which year did the Berlin Wall fall?", ["1987", "1988", "1989", "1991"], 2, Medium),
    entry!("t08", "Which composer wrote the opera 'The Magic Flute'?", ["Mozart", "Verdi", "Wagner", "Puccini"], 0, Medium),
    entry!("t09", "What is the longest river in Europe?", ["Danube", "Rhine", "Volga", "Dnieper"], 2, Medium),
    entry!("t10", "How many points is a natural blackjack's hand total?", ["20", "21", "22", "11"], 1, Easy),
    entry!("t11", "Which gas makes up most of Earth's atmosphere?", ["Oxygen", "Nitrogen", "Argon", "Carbon dioxide"], 1, Medium),
    entry!("t12", "Who painted 'The Scream'?", ["Munch", "Klimt", "Kandinsky", "Monet"], 0, Medium),
    entry!("t13", "What is the smallest prime number greater than 100?", ["101", "103", "107", "109"], 0, Hard),
    entry!("t14", "Which mathematician proved the incompleteness theorems?", ["Hilbert", "Gödel", "Turing", "Cantor"], 1, Hard),
    entry!("t15", "In poker, how many distinct five-card straight flushes exist (including royals)?", ["36", "40", "44", "48"], 1, Hard),
    entry!("t16", "What is the half-life of carbon-14, to the nearest century?", ["3,700 years", "5,700 years", "7,700 years", "9,700 years"], 1, Hard),
    entry!("t17", "Which treaty established the European Economic Community?", ["Maastricht", "Lisbon", "Rome", "Paris"], 2, Hard),
    entry!("t18", "What is the maximum score on a Scandinavian Yatzy card?", ["300", "350", "374", "400"], 2, Hard),
];

pub static TRACKS: &[BankEntry] = &[
    entry!("m01", "Clip 1: who performs this track?", ["ABBA", "Roxette", "a-ha", "Ace of Base"], 0, Easy),
    entry!("m02", "Clip 2: name the song", ["Take On Me", "The Sign", "Listen to Your Heart", "Dancing Queen"], 0, Easy),
    entry!("m03", "Clip 3: which decade was this released in?", ["1960s", "1970s", "1980s", "1990s"], 2, Medium),
    entry!("m04", "Clip 4: who performs this track?", ["Robyn", "Lykke Li", "Zara Larsson", "Tove Lo"], 0, Medium),
    entry!("m05", "Clip 5: name the song", ["Wonderwall", "Creep", "Yellow", "Bitter Sweet Symphony"], 1, Easy),
    entry!("m06", "Clip 6: which instrument opens this piece?", ["Violin", "Piano", "Flute", "Trumpet"], 1, Medium),
    entry!("m07", "Clip 7: who performs this track?", ["Kraftwerk", "Depeche Mode", "New Order", "Pet Shop Boys"], 0, Hard),
    entry!("m08", "Clip 8: name the composer", ["Grieg", "Sibelius", "Nielsen", "Stenhammar"], 0, Medium),
    entry!("m09", "Clip 9: which album is this from?", ["Thriller", "Bad", "Off the Wall", "Dangerous"], 0, Medium),
    entry!("m10", "Clip 10: who performs this track?", ["Avicii", "Swedish House Mafia", "Alesso", "Axwell"], 0, Easy),
];
