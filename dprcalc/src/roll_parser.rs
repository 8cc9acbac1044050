use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res},
    multi::many0,
    sequence::{delimited, preceded, separated_pair},
};

use crate::{
    error::{DprError, Result},
    rules::dice::DiceTerm,
};

enum Part {
    Dice(u32, u32),
    Flat(u32),
}

/// Parses a damage expression such as `"2d6+1d4+3"` into dice terms.
///
/// The expression must start with a dice term. Flat amounts are added to the
/// `plus` of the dice term before them. Whitespace around `+` is allowed.
pub fn parse_dice_expr(input: &str) -> Result<Vec<DiceTerm>> {
    let parsed = all_consuming(delimited(space0, dice_expr, space0)).parse(input.trim());
    let (first, rest) = match parsed {
        Ok((_, parts)) => parts,
        Err(_) => return Err(DprError::InvalidDiceExpression(input.to_string())),
    };

    let mut terms = vec![DiceTerm::new(first.0, first.1, 0)?];
    for part in rest {
        match part {
            Part::Dice(count, sides) => terms.push(DiceTerm::new(count, sides, 0)?),
            Part::Flat(amount) => {
                if let Some(last) = terms.pop() {
                    let plus = last.plus().checked_add(amount).ok_or_else(|| {
                        DprError::InvalidDice(format!("modifier overflow in {input:?}"))
                    })?;
                    terms.push(last.with_plus(plus));
                }
            }
        }
    }
    Ok(terms)
}

fn dice_expr(input: &str) -> IResult<&str, ((u32, u32), Vec<Part>)> {
    (dice, many0(preceded((space0, char('+'), space0), part))).parse(input)
}

fn part(input: &str) -> IResult<&str, Part> {
    alt((
        map(dice, |(count, sides)| Part::Dice(count, sides)),
        map(number, Part::Flat),
    ))
    .parse(input)
}

fn dice(input: &str) -> IResult<&str, (u32, u32)> {
    separated_pair(number, alt((char('d'), char('D'))), number).parse(input)
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>()).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_term() {
        let terms = parse_dice_expr("2d6").unwrap();
        assert_eq!(terms, vec![DiceTerm::new(2, 6, 0).unwrap()]);
    }

    #[test]
    fn test_parse_flat_folds_into_previous_term() {
        let terms = parse_dice_expr("2d6+3").unwrap();
        assert_eq!(terms, vec![DiceTerm::new(2, 6, 0).unwrap().with_plus(3)]);

        let terms = parse_dice_expr("1d8 + 2 + 1d4 + 1").unwrap();
        assert_eq!(
            terms,
            vec![
                DiceTerm::new(1, 8, 0).unwrap().with_plus(2),
                DiceTerm::new(1, 4, 0).unwrap().with_plus(1),
            ]
        );
    }

    #[test]
    fn test_parse_multiple_terms() {
        let terms = parse_dice_expr(" 2D10+1d6 ").unwrap();
        assert_eq!(
            terms,
            vec![DiceTerm::new(2, 10, 0).unwrap(), DiceTerm::new(1, 6, 0).unwrap()]
        );
        assert_eq!(crate::rules::dice::average(&terms), 14.5);
    }

    #[test]
    fn test_parse_syntax_errors() {
        for input in ["", "d6", "2d", "2d6+", "2d6-1", "3", "+2d6", "2d6 3", "2x6"] {
            assert!(
                matches!(parse_dice_expr(input), Err(DprError::InvalidDiceExpression(_))),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_invalid_dice() {
        assert!(matches!(parse_dice_expr("2d7"), Err(DprError::InvalidDice(_))));
        assert!(matches!(parse_dice_expr("0d6"), Err(DprError::InvalidDice(_))));
        assert!(matches!(parse_dice_expr("1d6+1d3"), Err(DprError::InvalidDice(_))));
    }
}
