//! 表单选项目录

pub const CATEGORIES: [&str; 9] = [
    "Roupas",
    "Alimentos",
    "Móveis",
    "Livros",
    "Brinquedos",
    "Eletrônicos",
    "Utensílios domésticos",
    "Material escolar",
    "Outros",
];

pub const CONDITIONS: [&str; 5] = [
    "Novo",
    "Como novo",
    "Bom estado",
    "Estado regular",
    "Precisa de reparo",
];

/// 巴西各州缩写
pub const STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];
