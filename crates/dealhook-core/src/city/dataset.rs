//! Built-in city→timezone dataset and its alias table.
//!
//! Keys are canonical: lower-case, trimmed, single-spaced, with `ё` written
//! as `е`. Short codes are unique per city.

pub const DATASET_VERSION: &str = "2025.1";

/// `(canonical name, short code, UTC offset in hours)`.
pub const CITIES: &[(&str, &str, i8)] = &[
    ("абакан", "АБК", 7),
    ("анадырь", "АНД", 12),
    ("архангельск", "АРХ", 3),
    ("астрахань", "АСТ", 4),
    ("барнаул", "БРН", 7),
    ("белгород", "БЛГ", 3),
    ("благовещенск", "БЛВ", 9),
    ("братск", "БРТ", 8),
    ("брянск", "БРЯ", 3),
    ("владивосток", "ВЛД", 10),
    ("владикавказ", "ВКВ", 3),
    ("владимир", "ВЛМ", 3),
    ("волгоград", "ВЛГ", 3),
    ("волжский", "ВЛЖ", 3),
    ("вологда", "ВЛО", 3),
    ("воронеж", "ВРН", 3),
    ("горно-алтайск", "ГАЛ", 7),
    ("грозный", "ГРЗ", 3),
    ("дзержинск", "ДЗР", 3),
    ("екатеринбург", "ЕКБ", 5),
    ("иваново", "ИВН", 3),
    ("ижевск", "ИЖВ", 4),
    ("иркутск", "ИРК", 8),
    ("йошкар-ола", "ЙОЛ", 3),
    ("казань", "КЗН", 3),
    ("калининград", "КЛД", 2),
    ("калуга", "КЛГ", 3),
    ("кемерово", "КМР", 7),
    ("киров", "КРВ", 3),
    ("комсомольск-на-амуре", "КМС", 10),
    ("кострома", "КСТ", 3),
    ("краснодар", "КРД", 3),
    ("красноярск", "КРС", 7),
    ("курган", "КРГ", 5),
    ("курск", "КУР", 3),
    ("кызыл", "КЗЛ", 7),
    ("липецк", "ЛПЦ", 3),
    ("магадан", "МГД", 11),
    ("магнитогорск", "МГН", 5),
    ("махачкала", "МХЧ", 3),
    ("москва", "МСК", 3),
    ("мурманск", "МРМ", 3),
    ("набережные челны", "НЧЛ", 3),
    ("нальчик", "НЛЧ", 3),
    ("нижневартовск", "НВР", 5),
    ("нижний новгород", "НН", 3),
    ("нижний тагил", "НТГ", 5),
    ("новокузнецк", "НКЗ", 7),
    ("новороссийск", "НРС", 3),
    ("новосибирск", "НСК", 7),
    ("новый уренгой", "НУР", 5),
    ("норильск", "НРЛ", 7),
    ("омск", "ОМС", 6),
    ("орел", "ОРЛ", 3),
    ("оренбург", "ОРБ", 5),
    ("пенза", "ПНЗ", 3),
    ("пермь", "ПРМ", 5),
    ("петрозаводск", "ПТЗ", 3),
    ("петропавловск-камчатский", "ПКЧ", 12),
    ("псков", "ПСК", 3),
    ("пятигорск", "ПТГ", 3),
    ("ростов-на-дону", "РСТ", 3),
    ("рязань", "РЗН", 3),
    ("салехард", "СЛХ", 5),
    ("самара", "СМР", 4),
    ("санкт-петербург", "СПБ", 3),
    ("саранск", "СРН", 3),
    ("саратов", "СРТ", 4),
    ("севастополь", "СВС", 3),
    ("симферополь", "СМФ", 3),
    ("смоленск", "СМЛ", 3),
    ("сочи", "СЧИ", 3),
    ("ставрополь", "СТВ", 3),
    ("стерлитамак", "СТР", 5),
    ("сургут", "СРГ", 5),
    ("сыктывкар", "СЫК", 3),
    ("таганрог", "ТГР", 3),
    ("тамбов", "ТМБ", 3),
    ("тверь", "ТВР", 3),
    ("тольятти", "ТЛТ", 4),
    ("томск", "ТМС", 7),
    ("тула", "ТЛ", 3),
    ("тюмень", "ТЮМ", 5),
    ("улан-удэ", "УУ", 8),
    ("ульяновск", "УЛН", 4),
    ("уфа", "УФА", 5),
    ("хабаровск", "ХБР", 10),
    ("ханты-мансийск", "ХМС", 5),
    ("чебоксары", "ЧБК", 3),
    ("челябинск", "ЧЛБ", 5),
    ("череповец", "ЧРП", 3),
    ("чита", "ЧТ", 9),
    ("южно-сахалинск", "ЮСХ", 11),
    ("якутск", "ЯКТ", 9),
    ("ярославль", "ЯРС", 3),
];

/// `(alias, canonical name)`: English and transliterated spellings plus
/// common native abbreviations.
pub const ALIASES: &[(&str, &str)] = &[
    ("спб", "санкт-петербург"),
    ("питер", "санкт-петербург"),
    ("петербург", "санкт-петербург"),
    ("санкт петербург", "санкт-петербург"),
    ("мск", "москва"),
    ("екб", "екатеринбург"),
    ("нск", "новосибирск"),
    ("ростов", "ростов-на-дону"),
    ("нижний", "нижний новгород"),
    // Dotted forms never come out of comment extraction; they match
    // structured city fields and `dealhook city resolve` only.
    ("н. новгород", "нижний новгород"),
    ("челны", "набережные челны"),
    ("комсомольск", "комсомольск-на-амуре"),
    ("abakan", "абакан"),
    ("anadyr", "анадырь"),
    ("arkhangelsk", "архангельск"),
    ("astrakhan", "астрахань"),
    ("barnaul", "барнаул"),
    ("belgorod", "белгород"),
    ("blagoveshchensk", "благовещенск"),
    ("bratsk", "братск"),
    ("bryansk", "брянск"),
    ("cheboksary", "чебоксары"),
    ("chelyabinsk", "челябинск"),
    ("cherepovets", "череповец"),
    ("chita", "чита"),
    ("dzerzhinsk", "дзержинск"),
    ("ekaterinburg", "екатеринбург"),
    ("yekaterinburg", "екатеринбург"),
    ("gorno-altaysk", "горно-алтайск"),
    ("grozny", "грозный"),
    ("irkutsk", "иркутск"),
    ("ivanovo", "иваново"),
    ("izhevsk", "ижевск"),
    ("kaliningrad", "калининград"),
    ("kaluga", "калуга"),
    ("kazan", "казань"),
    ("kemerovo", "кемерово"),
    ("khabarovsk", "хабаровск"),
    ("khanty-mansiysk", "ханты-мансийск"),
    ("kirov", "киров"),
    ("komsomolsk-on-amur", "комсомольск-на-амуре"),
    ("kostroma", "кострома"),
    ("krasnodar", "краснодар"),
    ("krasnoyarsk", "красноярск"),
    ("kurgan", "курган"),
    ("kursk", "курск"),
    ("kyzyl", "кызыл"),
    ("lipetsk", "липецк"),
    ("magadan", "магадан"),
    ("magnitogorsk", "магнитогорск"),
    ("makhachkala", "махачкала"),
    ("moscow", "москва"),
    ("moskva", "москва"),
    ("murmansk", "мурманск"),
    ("naberezhnye chelny", "набережные челны"),
    ("nalchik", "нальчик"),
    ("nizhnevartovsk", "нижневартовск"),
    ("nizhny novgorod", "нижний новгород"),
    ("nizhniy novgorod", "нижний новгород"),
    ("nizhny tagil", "нижний тагил"),
    ("norilsk", "норильск"),
    ("novokuznetsk", "новокузнецк"),
    ("novorossiysk", "новороссийск"),
    ("novosibirsk", "новосибирск"),
    ("novy urengoy", "новый уренгой"),
    ("omsk", "омск"),
    ("orel", "орел"),
    ("oryol", "орел"),
    ("orenburg", "оренбург"),
    ("penza", "пенза"),
    ("perm", "пермь"),
    ("petrozavodsk", "петрозаводск"),
    ("petropavlovsk-kamchatsky", "петропавловск-камчатский"),
    ("pskov", "псков"),
    ("pyatigorsk", "пятигорск"),
    ("rostov", "ростов-на-дону"),
    ("rostov-on-don", "ростов-на-дону"),
    ("ryazan", "рязань"),
    ("saint petersburg", "санкт-петербург"),
    ("saint-petersburg", "санкт-петербург"),
    ("st petersburg", "санкт-петербург"),
    // Structured fields only, like "н. новгород".
    ("st. petersburg", "санкт-петербург"),
    ("petersburg", "санкт-петербург"),
    ("spb", "санкт-петербург"),
    ("salekhard", "салехард"),
    ("samara", "самара"),
    ("saransk", "саранск"),
    ("saratov", "саратов"),
    ("sevastopol", "севастополь"),
    ("simferopol", "симферополь"),
    ("smolensk", "смоленск"),
    ("sochi", "сочи"),
    ("stavropol", "ставрополь"),
    ("sterlitamak", "стерлитамак"),
    ("surgut", "сургут"),
    ("syktyvkar", "сыктывкар"),
    ("taganrog", "таганрог"),
    ("tambov", "тамбов"),
    ("togliatti", "тольятти"),
    ("tolyatti", "тольятти"),
    ("tomsk", "томск"),
    ("tula", "тула"),
    ("tver", "тверь"),
    ("tyumen", "тюмень"),
    ("ufa", "уфа"),
    ("ulan-ude", "улан-удэ"),
    ("ulyanovsk", "ульяновск"),
    ("vladikavkaz", "владикавказ"),
    ("vladimir", "владимир"),
    ("vladivostok", "владивосток"),
    ("volgograd", "волгоград"),
    ("vologda", "вологда"),
    ("volzhsky", "волжский"),
    ("voronezh", "воронеж"),
    ("yakutsk", "якутск"),
    ("yaroslavl", "ярославль"),
    ("yoshkar-ola", "йошкар-ола"),
    ("yuzhno-sakhalinsk", "южно-сахалинск"),
];

#[cfg(test)]
mod tests {
    use super::{ALIASES, CITIES};
    use crate::city::directory::canonical_city_key;
    use std::collections::HashSet;

    #[test]
    fn city_keys_are_unique_and_canonical() {
        let mut seen = HashSet::new();
        for (name, _, _) in CITIES {
            assert_eq!(canonical_city_key(name), *name, "non-canonical key {name}");
            assert!(seen.insert(*name), "duplicate city {name}");
        }
    }

    #[test]
    fn short_codes_are_unique() {
        let mut seen = HashSet::new();
        for (name, code, _) in CITIES {
            assert!(seen.insert(*code), "code {code} reused by {name}");
        }
    }

    #[test]
    fn aliases_target_known_cities() {
        let cities: HashSet<&str> = CITIES.iter().map(|(name, _, _)| *name).collect();
        let mut seen = HashSet::new();
        for (alias, target) in ALIASES {
            assert_eq!(canonical_city_key(alias), *alias, "non-canonical alias {alias}");
            assert!(seen.insert(*alias), "duplicate alias {alias}");
            assert!(cities.contains(target), "alias {alias} -> unknown {target}");
            assert!(!cities.contains(alias), "alias {alias} shadows a city");
        }
    }
}
