use super::{escape_html, single_line};
use crate::matcher::EntityMention;
use crate::pipeline::{AnnotatedPaper, Report};
use crate::record::pmc_link;

const NO_SENTENCE: &str = "_no exact sentence match found_";

/// Markdown report: one collapsible section per paper with matches, then skipped ids.
pub fn format_list(report: &Report, keywords: (&str, &str)) -> String {
    let (k1, k2) = keywords;
    let mut out = format!(
        "# Microbiome regulation: {} × {}\n\n",
        single_line(k1),
        single_line(k2)
    );
    out.push_str(&format!("Query: `{}`\n\n", report.term.replace('`', "'")));
    out.push_str(&super::found_line(report));
    out.push_str("\n\n");

    if report.found == 0 {
        return out;
    }

    out.push_str(&super::summary_line(report));
    out.push_str("\n\n");

    let mut matched = 0;
    for paper in report.matched_papers() {
        format_paper(paper, &mut out);
        matched += 1;
    }
    if matched == 0 {
        out.push_str("No bacterial taxa found in the retrieved papers.\n\n");
    }

    format_skipped(report, &mut out);
    out
}

fn format_paper(paper: &AnnotatedPaper, out: &mut String) {
    let record = &paper.record;
    out.push_str("<details>\n");
    out.push_str(&format!(
        "<summary>{} (PMID {})</summary>\n\n",
        escape_html(&single_line(record.display_title())),
        record.pmid
    ));

    out.push_str(&format!(
        "[PubMed]({}) · {}",
        record.link,
        record.source.label()
    ));
    if let Some(pmcid) = &record.pmcid {
        out.push_str(&format!(" · [{pmcid}]({})", pmc_link(pmcid)));
    }
    if let Some(direction) = paper.regulation {
        out.push_str(&format!(" · {}", direction.label()));
    }
    out.push_str("\n\n");

    for mention in &paper.mentions {
        format_mention(mention, out);
    }
    out.push_str("</details>\n\n");
}

fn format_mention(mention: &EntityMention, out: &mut String) {
    let noun = if mention.count == 1 { "mention" } else { "mentions" };
    out.push_str(&format!(
        "**{}** ({} {noun})\n",
        mention.entity, mention.count
    ));
    if mention.sentences.is_empty() {
        out.push_str(&format!("- {NO_SENTENCE}\n"));
    } else {
        for sentence in &mention.sentences {
            out.push_str(&format!("- {}\n", escape_html(sentence)));
        }
    }
    out.push('\n');
}

fn format_skipped(report: &Report, out: &mut String) {
    if report.skipped.is_empty() {
        return;
    }
    out.push_str("<details>\n");
    out.push_str(&format!(
        "<summary>Skipped papers ({})</summary>\n\n",
        report.skipped.len()
    ));
    for skipped in &report.skipped {
        out.push_str(&format!(
            "- [{}]({}) ({})\n",
            skipped.pmid,
            skipped.link(),
            single_line(&skipped.reason)
        ));
    }
    out.push_str("\n</details>\n");
}
