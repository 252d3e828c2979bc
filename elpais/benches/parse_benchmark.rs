use criterion::{criterion_group, criterion_main, Criterion};
use elections::assemble::assemble_dataset;
use elections::municipality::{MunicipalityLink, NormalizedMunicipality};
use elections::normalize::normalize_municipality;
use elpais::parse_elpais::parse_municipality_page;

/// A synthetic results page with a realistic number of parties.
fn make_page(seed:usize) -> String {
    let mut html = String::from(r#"<html><body><table id="tablaResumen">"#);
    for (header,number,percentage) in [("Escrutado:","","100,00 %"),("Votos contabilizados:","118.041","71,59 %"),("Abstenciones:","46.838","28,41 %"),("Votos nulos:","641","0,54 %"),("Votos en blanco:","877","0,75 %")] {
        html.push_str(&format!(r#"<tr><th class="encabezado">{}</th><td class="tipoNumero">{}</td><td class="tipoPorciento">{}</td></tr>"#,header,number,percentage));
    }
    html.push_str(r#"</table><table id="tablaVotosPartidos">"#);
    for (i,party) in ["PP","PSOE","Más Madrid","Vox","Podemos-IU","Cs","PACMA","Recortes Cero"].iter().enumerate() {
        html.push_str(&format!(r#"<tr><th class="nombrePartido">{}</th><td class="tipoNumeroVotos">{}.{:03}</td><td class="tipoPorcientoVotos">{},{:02} %</td></tr>"#,party,seed+i,(seed*7+i)%1000,i*3,seed%100));
    }
    html.push_str("</table></body></html>");
    html
}

fn parse_pages(c: &mut Criterion) {
    let pages : Vec<(MunicipalityLink,String)> = (0..179).map(|i|(MunicipalityLink::new(&format!("Municipio {}",i),&format!("https://example.com/28/{:03}.html",i)),make_page(i))).collect();
    c.bench_function("Parse and normalize 179 pages", |b| b.iter(|| {
        pages.iter().map(|(link,html)|normalize_municipality(&parse_municipality_page(html,link))).collect::<Vec<NormalizedMunicipality>>()
    }));
}

fn assemble(c: &mut Criterion) {
    let normalized : Vec<NormalizedMunicipality> = (0..179).map(|i|{
        let link = MunicipalityLink::new(&format!("Municipio {}",i),&format!("https://example.com/28/{:03}.html",i));
        normalize_municipality(&parse_municipality_page(&make_page(i),&link))
    }).collect();
    c.bench_function("Assemble 179 municipalities", |b| b.iter(|| assemble_dataset("2021",&normalized)));
}

criterion_group!(benches, parse_pages, assemble);
criterion_main!(benches);
