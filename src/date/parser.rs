use combine::{
    eof, many1,
    parser::char::{char, digit},
    Parser, Stream,
};

/// `DD.MM.YYYY`, yielding the three components in written order.
///
/// Only the shape is checked: each component is a run of ASCII digits, of any
/// length, and nothing may follow the year.
pub fn dotted_date<Input>() -> impl Parser<Input, Output = (String, String, String)>
where
    Input: Stream<Token = char>,
{
    (
        component(),
        char('.'),
        component(),
        char('.'),
        component(),
        eof(),
    )
        .map(|(day, _, month, _, year, _)| (day, month, year))
}

fn component<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
{
    many1::<String, _, _>(digit())
}
